mod common;

use barbershop_scheduling::application::account::{delete_barber, delete_customer};
use barbershop_scheduling::application::appointment::{
    appointments_for_customer, book_appointment, cancel_appointment, conclude_appointment,
};
use barbershop_scheduling::application::membership::*;
use barbershop_scheduling::application::{ConflictReason, Resource, SchedulingError};
use barbershop_scheduling::domain::*;
use common::*;

const STAFF_EMAIL: &str = "staff@shop.test";
const RIVAL_EMAIL: &str = "rival@shop.test";
const RIVAL_REGISTRATION: &str = "98.765.432/0001-10";

fn reason(err: SchedulingError) -> ConflictReason {
    err.conflict_reason()
        .unwrap_or_else(|| panic!("expected a conflict, got {err:?}"))
}

async fn member_view(fixture: &ShopFixture, email: &str) -> Option<Barber> {
    list_barbers(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap()
        .into_iter()
        .find(|b| b.email == email)
}

/// Staff member who joined through an approved request.
async fn join_as_staff(fixture: &ShopFixture) -> Barber {
    let staff = seed_barber(
        &fixture.store,
        "Staff",
        STAFF_EMAIL,
        Some((time(9, 0), time(18, 0))),
    )
    .await;
    let request_id = request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();
    approve_join_request(&fixture.deps, OWNER_EMAIL, request_id)
        .await
        .unwrap();
    staff
}

async fn open_rival_shop(fixture: &ShopFixture) -> BarbershopId {
    seed_barber(&fixture.store, "Rival", RIVAL_EMAIL, None).await;
    create_barbershop(
        &fixture.deps,
        RIVAL_EMAIL,
        CreateBarbershop {
            name: "Rival Cuts".to_string(),
            registration_number: RIVAL_REGISTRATION.to_string(),
            address: None,
        },
    )
    .await
    .unwrap()
}

// ============================================================================
// Barbershop
// ============================================================================

#[tokio::test]
async fn test_create_barbershop_makes_requester_owner() {
    let fixture = ShopFixture::open().await;

    let shop = get_barbershop(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap();

    assert_eq!(shop.registration_number, REGISTRATION_NUMBER);
    assert!(fixture.owner.owns(fixture.barbershop_id));
    assert_eq!(list_barbershops(&fixture.deps).await.unwrap(), vec![shop]);
}

#[tokio::test]
async fn test_create_barbershop_with_taken_registration_number() {
    let fixture = ShopFixture::open().await;
    seed_barber(&fixture.store, "Rival", RIVAL_EMAIL, None).await;

    let err = create_barbershop(
        &fixture.deps,
        RIVAL_EMAIL,
        CreateBarbershop {
            name: "Copycat".to_string(),
            registration_number: REGISTRATION_NUMBER.to_string(),
            address: None,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(reason(err), ConflictReason::RegistrationNumberTaken);
}

#[tokio::test]
async fn test_update_barbershop_keeps_unset_fields() {
    let fixture = ShopFixture::open().await;

    let updated = update_barbershop(
        &fixture.deps,
        OWNER_EMAIL,
        UpdateBarbershop {
            name: Some("Cut, Shave & Co".to_string()),
            address: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Cut, Shave & Co");
    assert_eq!(updated.address.as_deref(), Some("Rua Augusta 100"));
}

// ============================================================================
// Join requests and staff
// ============================================================================

#[tokio::test]
async fn test_owner_cannot_leave() {
    let fixture = ShopFixture::open().await;

    let err = leave_barbershop(&fixture.deps, OWNER_EMAIL)
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::OwnerCannotLeave);
    let owner = member_view(&fixture, OWNER_EMAIL).await.unwrap();
    assert!(owner.owns(fixture.barbershop_id));
    assert_eq!(owner, fixture.owner);
}

#[tokio::test]
async fn test_approved_request_links_barber_and_is_removed() {
    let fixture = ShopFixture::open().await;

    let staff = join_as_staff(&fixture).await;

    let member = member_view(&fixture, STAFF_EMAIL).await.unwrap();
    assert_eq!(member.barber_id, staff.barber_id);
    assert!(!member.is_owner);
    assert!(
        pending_join_requests(&fixture.deps, OWNER_EMAIL)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_duplicate_pending_request_is_rejected() {
    let fixture = ShopFixture::open().await;
    seed_barber(&fixture.store, "Staff", STAFF_EMAIL, None).await;
    request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();

    let err = request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::JoinRequestAlreadyPending);
}

#[tokio::test]
async fn test_member_cannot_request_to_join() {
    let fixture = ShopFixture::open().await;
    let rival_shop = open_rival_shop(&fixture).await;
    assert_ne!(rival_shop, fixture.barbershop_id);

    let err = request_to_join(&fixture.deps, OWNER_EMAIL, RIVAL_REGISTRATION)
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::AlreadyMember);
}

#[tokio::test]
async fn test_request_to_unknown_barbershop() {
    let fixture = ShopFixture::open().await;
    seed_barber(&fixture.store, "Staff", STAFF_EMAIL, None).await;

    let err = request_to_join(&fixture.deps, STAFF_EMAIL, "00.000.000/0000-00")
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::NotFound(Resource::Barbershop)));
}

#[tokio::test]
async fn test_approval_fails_when_barber_joined_elsewhere() {
    let fixture = ShopFixture::open().await;
    open_rival_shop(&fixture).await;
    seed_barber(&fixture.store, "Staff", STAFF_EMAIL, None).await;
    let ours = request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();
    let theirs = request_to_join(&fixture.deps, STAFF_EMAIL, RIVAL_REGISTRATION)
        .await
        .unwrap();
    approve_join_request(&fixture.deps, RIVAL_EMAIL, theirs)
        .await
        .unwrap();

    let err = approve_join_request(&fixture.deps, OWNER_EMAIL, ours)
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::AlreadyMember);
    let pending = pending_join_requests(&fixture.deps, OWNER_EMAIL)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].join_request_id, ours);
    assert!(member_view(&fixture, STAFF_EMAIL).await.is_none());
}

#[tokio::test]
async fn test_only_the_addressed_owner_decides_a_request() {
    let fixture = ShopFixture::open().await;
    open_rival_shop(&fixture).await;
    seed_barber(&fixture.store, "Staff", STAFF_EMAIL, None).await;
    let request_id = request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();

    let err = approve_join_request(&fixture.deps, RIVAL_EMAIL, request_id)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::RequesterNotOwner);

    reject_join_request(&fixture.deps, OWNER_EMAIL, request_id)
        .await
        .unwrap();
    assert!(
        join_request_history(&fixture.deps, STAFF_EMAIL)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_leave_clears_membership_and_assignments() {
    let fixture = ShopFixture::open().await;
    let staff = join_as_staff(&fixture).await;
    assign_activities(&fixture.deps, STAFF_EMAIL, vec![fixture.haircut])
        .await
        .unwrap();

    leave_barbershop(&fixture.deps, STAFF_EMAIL).await.unwrap();

    assert!(member_view(&fixture, STAFF_EMAIL).await.is_none());
    assert!(
        assigned_activities(&fixture.deps, staff.barber_id)
            .await
            .unwrap()
            .is_empty()
    );
    // nothing left to leave
    leave_barbershop(&fixture.deps, STAFF_EMAIL).await.unwrap();
}

#[tokio::test]
async fn test_remove_barber_rules() {
    let fixture = ShopFixture::open().await;
    let staff = join_as_staff(&fixture).await;

    let err = remove_barber(&fixture.deps, STAFF_EMAIL, fixture.owner.barber_id)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::RequesterNotOwner);

    let err = remove_barber(&fixture.deps, OWNER_EMAIL, fixture.owner.barber_id)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::OwnerCannotRemoveSelf);

    remove_barber(&fixture.deps, OWNER_EMAIL, staff.barber_id)
        .await
        .unwrap();
    assert!(member_view(&fixture, STAFF_EMAIL).await.is_none());

    let err = remove_barber(&fixture.deps, OWNER_EMAIL, staff.barber_id)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::BarberNotInBarbershop);
}

#[tokio::test]
async fn test_assign_activities_of_another_shop_is_rejected() {
    let fixture = ShopFixture::open().await;
    open_rival_shop(&fixture).await;

    let err = assign_activities(&fixture.deps, RIVAL_EMAIL, vec![fixture.haircut])
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::ForeignResource);
}

#[tokio::test]
async fn test_set_work_hours_rejects_inverted_window() {
    let fixture = ShopFixture::open().await;

    let err = set_work_hours(
        &fixture.deps,
        OWNER_EMAIL,
        SetWorkHours {
            start: time(18, 0),
            end: time(9, 0),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(reason(err), ConflictReason::InvalidWorkHours);
}

// ============================================================================
// Activities and highlights
// ============================================================================

#[tokio::test]
async fn test_update_activity_rejects_zero_duration() {
    let fixture = ShopFixture::open().await;

    let err = update_activity(
        &fixture.deps,
        OWNER_EMAIL,
        fixture.haircut,
        UpdateActivity {
            duration_minutes: Some(0),
            ..UpdateActivity::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(reason(err), ConflictReason::InvalidActivityDuration);

    let updated = update_activity(
        &fixture.deps,
        OWNER_EMAIL,
        fixture.haircut,
        UpdateActivity {
            price_cents: Some(4500),
            ..UpdateActivity::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.price_cents, 4500);
    assert_eq!(updated.duration_minutes, 30);
}

#[tokio::test]
async fn test_create_activity_requires_owner() {
    let fixture = ShopFixture::open().await;
    join_as_staff(&fixture).await;

    let err = create_activity(
        &fixture.deps,
        STAFF_EMAIL,
        CreateActivity {
            name: "Shave".to_string(),
            price_cents: 2000,
            duration_minutes: 15,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(reason(err), ConflictReason::RequesterNotOwner);
}

#[tokio::test]
async fn test_delete_activity_in_use_is_refused_until_cancelled() {
    let fixture = ShopFixture::open().await;
    let appointment_id =
        fixture.book_haircut(at(10, 0)).await;

    let err = delete_activity(&fixture.deps, OWNER_EMAIL, fixture.haircut)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::ActivityHasScheduledAppointments);

    cancel_appointment(&fixture.deps, appointment_id, CUSTOMER_EMAIL)
        .await
        .unwrap();
    delete_activity(&fixture.deps, OWNER_EMAIL, fixture.haircut)
        .await
        .unwrap();

    assert!(
        list_activities(&fixture.deps, fixture.barbershop_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        assigned_activities(&fixture.deps, fixture.owner.barber_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_highlights_are_managed_by_their_owner() {
    let fixture = ShopFixture::open().await;
    open_rival_shop(&fixture).await;
    let highlight_id = add_highlight(
        &fixture.deps,
        OWNER_EMAIL,
        AddHighlight {
            image_url: "https://img.test/fade.jpg".to_string(),
            public_id: Some("fade".to_string()),
        },
    )
    .await
    .unwrap();

    let err = remove_highlight(&fixture.deps, RIVAL_EMAIL, highlight_id)
        .await
        .unwrap_err();
    assert_eq!(reason(err), ConflictReason::ForeignResource);

    let highlights = list_highlights(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap();
    assert_eq!(highlights.len(), 1);

    remove_highlight(&fixture.deps, OWNER_EMAIL, highlight_id)
        .await
        .unwrap();
    assert!(
        list_highlights(&fixture.deps, fixture.barbershop_id)
            .await
            .unwrap()
            .is_empty()
    );
}

// ============================================================================
// Closing a barbershop
// ============================================================================

#[tokio::test]
async fn test_close_barbershop_blocked_by_scheduled_appointment() {
    let fixture = ShopFixture::open().await;
    join_as_staff(&fixture).await;
    fixture.book_haircut(at(10, 0)).await;
    let staff_before = list_barbers(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap();

    let err = close_barbershop(&fixture.deps, OWNER_EMAIL, PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(
        reason(err),
        ConflictReason::BarbershopHasScheduledAppointments
    );
    get_barbershop(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap();
    assert_eq!(
        list_barbers(&fixture.deps, fixture.barbershop_id)
            .await
            .unwrap(),
        staff_before
    );
    assert_eq!(
        list_activities(&fixture.deps, fixture.barbershop_id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_close_barbershop_with_wrong_password() {
    let fixture = ShopFixture::open().await;

    let err = close_barbershop(&fixture.deps, OWNER_EMAIL, "wrong")
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::InvalidPassword);
    get_barbershop(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_close_barbershop_cascades_and_keeps_history() {
    let fixture = ShopFixture::open().await;
    let staff = join_as_staff(&fixture).await;
    assign_activities(&fixture.deps, STAFF_EMAIL, vec![fixture.haircut])
        .await
        .unwrap();
    seed_barber(&fixture.store, "Applicant", "applicant@shop.test", None).await;
    request_to_join(&fixture.deps, "applicant@shop.test", REGISTRATION_NUMBER)
        .await
        .unwrap();
    add_highlight(
        &fixture.deps,
        OWNER_EMAIL,
        AddHighlight {
            image_url: "https://img.test/front.jpg".to_string(),
            public_id: None,
        },
    )
    .await
    .unwrap();
    let past = fixture.book_haircut(at(10, 0)).await;
    conclude_appointment(&fixture.deps, past, OWNER_EMAIL)
        .await
        .unwrap();

    close_barbershop(&fixture.deps, OWNER_EMAIL, PASSWORD)
        .await
        .unwrap();

    let err = get_barbershop(&fixture.deps, fixture.barbershop_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(Resource::Barbershop)));
    assert!(list_barbershops(&fixture.deps).await.unwrap().is_empty());
    assert!(
        join_request_history(&fixture.deps, "applicant@shop.test")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        assigned_activities(&fixture.deps, staff.barber_id)
            .await
            .unwrap()
            .is_empty()
    );

    // both former members are free to open or join a shop again
    create_barbershop(
        &fixture.deps,
        OWNER_EMAIL,
        CreateBarbershop {
            name: "Second Chance".to_string(),
            registration_number: REGISTRATION_NUMBER.to_string(),
            address: None,
        },
    )
    .await
    .unwrap();
    request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();

    let history = appointments_for_customer(&fixture.deps, CUSTOMER_EMAIL)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, AppointmentStatus::Concluded);
}

// ============================================================================
// Account deletion
// ============================================================================

#[tokio::test]
async fn test_customer_with_appointments_cannot_be_deleted() {
    let fixture = ShopFixture::open().await;
    let appointment_id =
        fixture.book_haircut(at(10, 0)).await;
    cancel_appointment(&fixture.deps, appointment_id, CUSTOMER_EMAIL)
        .await
        .unwrap();

    let err = delete_customer(&fixture.deps, CUSTOMER_EMAIL)
        .await
        .unwrap_err();

    assert_eq!(reason(err), ConflictReason::CustomerReferenced);
}

#[tokio::test]
async fn test_customer_without_appointments_is_deleted() {
    let fixture = ShopFixture::open().await;

    delete_customer(&fixture.deps, CUSTOMER_EMAIL).await.unwrap();

    let err = delete_customer(&fixture.deps, CUSTOMER_EMAIL)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(Resource::Customer)));
}

#[tokio::test]
async fn test_owner_must_close_barbershop_before_deletion() {
    let fixture = ShopFixture::open().await;

    let err = delete_barber(&fixture.deps, OWNER_EMAIL).await.unwrap_err();

    assert_eq!(reason(err), ConflictReason::OwnerMustCloseBarbershop);
}

#[tokio::test]
async fn test_barber_deletion_drops_join_requests() {
    let fixture = ShopFixture::open().await;
    seed_barber(&fixture.store, "Staff", STAFF_EMAIL, None).await;
    request_to_join(&fixture.deps, STAFF_EMAIL, REGISTRATION_NUMBER)
        .await
        .unwrap();

    delete_barber(&fixture.deps, STAFF_EMAIL).await.unwrap();

    assert!(
        pending_join_requests(&fixture.deps, OWNER_EMAIL)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_barber_with_appointments_cannot_be_deleted() {
    let fixture = ShopFixture::open().await;
    join_as_staff(&fixture).await;
    assign_activities(&fixture.deps, STAFF_EMAIL, vec![fixture.haircut])
        .await
        .unwrap();
    let staff = member_view(&fixture, STAFF_EMAIL).await.unwrap();
    let mut cmd = fixture.haircut_at(at(10, 0));
    cmd.barber_id = staff.barber_id;
    book_appointment(&fixture.deps, cmd, CUSTOMER_EMAIL)
        .await
        .unwrap();

    let err = delete_barber(&fixture.deps, STAFF_EMAIL).await.unwrap_err();

    assert_eq!(reason(err), ConflictReason::BarberReferenced);
}
