mod activity_service;
mod barbershop_service;
mod join_request_service;
mod staff_service;

pub use activity_service::{create_activity, delete_activity, list_activities, update_activity};
pub use barbershop_service::{
    add_highlight, close_barbershop, create_barbershop, get_barbershop, list_barbers,
    list_barbershops, list_highlights, remove_highlight, update_barbershop,
};
pub use join_request_service::{
    approve_join_request, join_request_history, pending_join_requests, reject_join_request,
    request_to_join,
};
pub use staff_service::{
    assign_activities, assigned_activities, leave_barbershop, remove_barber, set_work_hours,
};
