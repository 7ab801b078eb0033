// crates/squad-gate-core/src/runtime/scope.rs
// ============================================================================
// Module: Squad Gate Scope Resolver
// Description: Resolves an actor and explicit request into an access scope.
// Purpose: Centralize role-specific visibility decisions for every engine.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Resolution turns `(actor, requested player?, requested team?)` into a
//! [`Scope`]. Explicit identifiers outside the computed scope are rejected
//! with [`AccessError::Forbidden`]; absent identifiers narrow silently to the
//! scope. Memberships are read from the store on every call.
//!
//! Existence is checked before scope for admins and coaches, so a missing
//! resource is reported as [`AccessError::NotFound`]. Players are checked for
//! ownership first: any foreign identifier is `Forbidden` whether or not it
//! exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Actor;
use crate::core::ActorProfile;
use crate::core::CoachId;
use crate::core::Measurement;
use crate::core::PlayerId;
use crate::core::Scope;
use crate::core::ScopeRequest;
use crate::core::ScopedSets;
use crate::core::SelfScope;
use crate::core::UserId;
use crate::interfaces::MembershipReader;
use crate::runtime::error::AccessError;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the access scope for a single request.
///
/// # Errors
///
/// Returns [`AccessError::NotFound`] when an admin or coach names a player or
/// team that does not exist, [`AccessError::Forbidden`] when an explicit
/// identifier falls outside the computed scope, and [`AccessError::Store`]
/// when membership reads fail.
pub fn resolve_scope<S>(
    store: &S,
    actor: &Actor,
    request: ScopeRequest,
) -> Result<Scope, AccessError>
where
    S: MembershipReader + ?Sized,
{
    match actor.profile {
        ActorProfile::Admin => {
            ensure_requested_exist(store, request)?;
            Ok(Scope::Unrestricted)
        }
        ActorProfile::Coach(coach_id) => {
            ensure_requested_exist(store, request)?;
            let sets = coach_sets(store, actor.user_id, coach_id)?;
            if let Some(team_id) = request.team_id
                && !sets.teams.contains(&team_id)
            {
                return Err(AccessError::Forbidden(format!("team {team_id} is outside scope")));
            }
            if let Some(player_id) = request.player_id
                && !sets.players.contains(&player_id)
            {
                return Err(AccessError::Forbidden(format!(
                    "player {player_id} is outside scope"
                )));
            }
            Ok(Scope::ScopedTo(sets))
        }
        ActorProfile::Player(player_id) => {
            if let Some(requested) = request.player_id
                && requested != player_id
            {
                return Err(AccessError::Forbidden(format!(
                    "player {requested} is outside scope"
                )));
            }
            if let Some(team_id) = request.team_id
                && !store.teams_for_player(player_id)?.contains(&team_id)
            {
                return Err(AccessError::Forbidden(format!("team {team_id} is outside scope")));
            }
            Ok(Scope::SelfOnly(SelfScope {
                user_id: actor.user_id,
                player_id,
            }))
        }
    }
}

/// Authorizes access to a single measurement through its owning player.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] when the owning player is outside the
/// actor's scope, or the store error when membership reads fail.
pub fn authorize_measurement<S>(
    store: &S,
    actor: &Actor,
    measurement: &Measurement,
) -> Result<Scope, AccessError>
where
    S: MembershipReader + ?Sized,
{
    resolve_scope(store, actor, ScopeRequest::player(measurement.player_id))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the coach allow-lists from current memberships.
fn coach_sets<S>(store: &S, user_id: UserId, coach_id: CoachId) -> Result<ScopedSets, AccessError>
where
    S: MembershipReader + ?Sized,
{
    let teams = store.teams_for_coach(coach_id)?;
    let players: BTreeSet<PlayerId> =
        if teams.is_empty() { BTreeSet::new() } else { store.players_in_teams(&teams)? };
    Ok(ScopedSets {
        user_id,
        coach_id,
        players,
        teams,
    })
}

/// Rejects explicit identifiers that do not exist at all.
fn ensure_requested_exist<S>(store: &S, request: ScopeRequest) -> Result<(), AccessError>
where
    S: MembershipReader + ?Sized,
{
    if let Some(player_id) = request.player_id
        && !store.player_exists(player_id)?
    {
        return Err(AccessError::NotFound(format!("player {player_id}")));
    }
    if let Some(team_id) = request.team_id
        && !store.team_exists(team_id)?
    {
        return Err(AccessError::NotFound(format!("team {team_id}")));
    }
    Ok(())
}
