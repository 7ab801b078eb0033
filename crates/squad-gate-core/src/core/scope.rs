// crates/squad-gate-core/src/core/scope.rs
// ============================================================================
// Module: Squad Gate Access Scope
// Description: Resolved per-request access scope for an actor.
// Purpose: Model role-specific visibility as one closed variant.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Scope`] is computed fresh for every request and threaded into every
//! engine component. Components branch on the variant once instead of
//! re-checking roles at each call site.
//!
//! An empty [`ScopedSets`] is not the same thing as [`Scope::Unrestricted`]:
//! it grants access to nothing, and every engine returns an empty result for it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CoachId;
use crate::core::identifiers::PlayerId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Scope Types
// ============================================================================

/// Explicit allow-lists derived from a coach's team memberships.
///
/// # Invariants
/// - `players` equals the union of players across exactly the teams in `teams`
///   at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedSets {
    /// Account of the coach (used for the own-actions rule).
    pub user_id: UserId,
    /// Coach profile identifier.
    pub coach_id: CoachId,
    /// Players reachable through team memberships.
    pub players: BTreeSet<PlayerId>,
    /// Teams the coach belongs to.
    pub teams: BTreeSet<TeamId>,
}

/// Singleton scope of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfScope {
    /// Account of the player.
    pub user_id: UserId,
    /// The caller's own player profile.
    pub player_id: PlayerId,
}

/// Resolved access scope for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Administrator: no filtering is applied downstream.
    Unrestricted,
    /// Coach: restricted to explicit allow-lists (possibly empty).
    ScopedTo(ScopedSets),
    /// Player: restricted to their own profile.
    SelfOnly(SelfScope),
}

impl Scope {
    /// Returns true when the scope grants access to the player.
    #[must_use]
    pub fn permits_player(&self, player_id: PlayerId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::ScopedTo(sets) => sets.players.contains(&player_id),
            Self::SelfOnly(own) => own.player_id == player_id,
        }
    }

    /// Returns true when the scope grants access to the team.
    ///
    /// Player scopes never carry teams; team checks for players go through
    /// membership lookups at resolution time.
    #[must_use]
    pub fn permits_team(&self, team_id: TeamId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::ScopedTo(sets) => sets.teams.contains(&team_id),
            Self::SelfOnly(_) => false,
        }
    }

    /// Returns true when the scope grants access to nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unrestricted | Self::SelfOnly(_) => false,
            Self::ScopedTo(sets) => sets.players.is_empty() && sets.teams.is_empty(),
        }
    }

    /// Returns the player allow-list, or `None` when unrestricted.
    #[must_use]
    pub fn player_allow_list(&self) -> Option<BTreeSet<PlayerId>> {
        match self {
            Self::Unrestricted => None,
            Self::ScopedTo(sets) => Some(sets.players.clone()),
            Self::SelfOnly(own) => Some(BTreeSet::from([own.player_id])),
        }
    }
}

/// Resources explicitly named by a request.
///
/// Absent fields narrow silently to the scope; present fields outside the
/// scope are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRequest {
    /// Explicitly requested player.
    pub player_id: Option<PlayerId>,
    /// Explicitly requested team.
    pub team_id: Option<TeamId>,
}

impl ScopeRequest {
    /// Request naming no specific resource.
    pub const NONE: Self = Self {
        player_id: None,
        team_id: None,
    };

    /// Request naming a specific player.
    #[must_use]
    pub const fn player(player_id: PlayerId) -> Self {
        Self {
            player_id: Some(player_id),
            team_id: None,
        }
    }

    /// Request naming a specific team.
    #[must_use]
    pub const fn team(team_id: TeamId) -> Self {
        Self {
            player_id: None,
            team_id: Some(team_id),
        }
    }
}
