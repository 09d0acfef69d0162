use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Activity, Barber, BarberId, Barbershop, BarbershopId, CreateBarbershop, JoinRequestId,
    JoinRequestStatus, MembershipError,
};

/// A barber's request to join a barbershop.
///
/// Approval and rejection both delete the request, so a stored request is
/// always pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub join_request_id: JoinRequestId,
    pub barber_id: BarberId,
    pub barbershop_id: BarbershopId,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Pure function: an unaffiliated barber opens a barbershop and becomes its owner.
///
/// Registration number uniqueness needs the store and is checked by the caller.
pub fn open_barbershop(
    owner: &Barber,
    cmd: &CreateBarbershop,
    now: DateTime<Utc>,
) -> Result<(Barbershop, Barber), MembershipError> {
    if owner.has_membership() {
        return Err(MembershipError::AlreadyMember);
    }

    let barbershop = Barbershop {
        barbershop_id: BarbershopId::new(),
        name: cmd.name.clone(),
        registration_number: cmd.registration_number.clone(),
        address: cmd.address.clone(),
        logo_url: None,
        banner_url: None,
        created_at: now,
        updated_at: now,
    };

    let owner = Barber {
        is_owner: true,
        barbershop_id: Some(barbershop.barbershop_id),
        updated_at: now,
        ..owner.clone()
    };

    Ok((barbershop, owner))
}

/// Pure function: file a pending request to join `barbershop_id`.
pub fn file_join_request(
    barber: &Barber,
    barbershop_id: BarbershopId,
    pending_exists: bool,
    now: DateTime<Utc>,
) -> Result<JoinRequest, MembershipError> {
    if barber.has_membership() {
        return Err(MembershipError::AlreadyMember);
    }
    if pending_exists {
        return Err(MembershipError::JoinRequestAlreadyPending);
    }

    Ok(JoinRequest {
        join_request_id: JoinRequestId::new(),
        barber_id: barber.barber_id,
        barbershop_id,
        status: JoinRequestStatus::Pending,
        created_at: now,
    })
}

/// The barbershop owned by `owner`, or `NotBarbershopOwner`.
pub fn owned_barbershop(owner: &Barber) -> Result<BarbershopId, MembershipError> {
    owner
        .owned_barbershop()
        .ok_or(MembershipError::NotBarbershopOwner)
}

pub fn ensure_owner_of(owner: &Barber, barbershop_id: BarbershopId) -> Result<(), MembershipError> {
    if !owner.owns(barbershop_id) {
        return Err(MembershipError::NotBarbershopOwner);
    }
    Ok(())
}

/// Something that belongs to `resource_barbershop` may only be managed by
/// that barbershop's owner.
pub fn ensure_owns_resource(
    owner: &Barber,
    resource_barbershop: BarbershopId,
) -> Result<BarbershopId, MembershipError> {
    let barbershop_id = owned_barbershop(owner)?;
    if barbershop_id != resource_barbershop {
        return Err(MembershipError::ForeignResource);
    }
    Ok(barbershop_id)
}

/// Pure function: approve a pending request and link the barber.
///
/// The barber may have joined another barbershop since filing; in that case
/// the approval fails and the request stays.
pub fn approve_join_request(
    owner: &Barber,
    request: &JoinRequest,
    barber: &Barber,
    now: DateTime<Utc>,
) -> Result<Barber, MembershipError> {
    ensure_owner_of(owner, request.barbershop_id)?;
    if barber.has_membership() {
        return Err(MembershipError::AlreadyMember);
    }

    Ok(Barber {
        is_owner: false,
        barbershop_id: Some(request.barbershop_id),
        activity_ids: Default::default(),
        updated_at: now,
        ..barber.clone()
    })
}

pub fn reject_join_request(owner: &Barber, request: &JoinRequest) -> Result<(), MembershipError> {
    ensure_owner_of(owner, request.barbershop_id)
}

/// Pure function: a staff member leaves its barbershop.
///
/// Returns `None` when the barber has no membership, leaving nothing to do.
pub fn leave_barbershop(
    barber: &Barber,
    now: DateTime<Utc>,
) -> Result<Option<Barber>, MembershipError> {
    if barber.is_owner {
        return Err(MembershipError::OwnerCannotLeave);
    }
    if !barber.has_membership() {
        return Ok(None);
    }
    Ok(Some(detach(barber, now)))
}

/// Pure function: the owner removes a staff member from its barbershop.
pub fn remove_from_barbershop(
    owner: &Barber,
    target: &Barber,
    now: DateTime<Utc>,
) -> Result<Barber, MembershipError> {
    let barbershop_id = owned_barbershop(owner)?;
    if target.barber_id == owner.barber_id {
        return Err(MembershipError::OwnerCannotRemoveSelf);
    }
    if !target.is_member_of(barbershop_id) {
        return Err(MembershipError::BarberNotInBarbershop);
    }
    Ok(detach(target, now))
}

/// Pure function: replace a member's assigned activities.
///
/// Every activity must be offered by the barber's own barbershop.
pub fn assign_activities(
    barber: &Barber,
    activities: &[Activity],
    now: DateTime<Utc>,
) -> Result<Barber, MembershipError> {
    let barbershop_id = barber.barbershop_id.ok_or(MembershipError::NotMember)?;
    if activities.iter().any(|a| a.barbershop_id != barbershop_id) {
        return Err(MembershipError::ForeignResource);
    }

    Ok(Barber {
        activity_ids: activities.iter().map(|a| a.activity_id).collect(),
        updated_at: now,
        ..barber.clone()
    })
}

/// Clear barbershop, ownership and every activity assignment.
pub fn detach(barber: &Barber, now: DateTime<Utc>) -> Barber {
    Barber {
        is_owner: false,
        barbershop_id: None,
        activity_ids: Default::default(),
        updated_at: now,
        ..barber.clone()
    }
}
