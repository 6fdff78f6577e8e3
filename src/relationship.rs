//! The match state machine and everything that rides along with a state
//! change: friend-zone proposals, conversation archival, and the
//! notifications each transition owes (or deliberately withholds).

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EndReason, FriendRequest, FriendRequestStatus, MatchState, Notification, NotificationKind,
};
use crate::storage::{MatchStore, SocialStore, TrustSafetyStore};

/// Shortest acceptable friend-zone message, after trimming.
pub const MIN_FRIEND_MESSAGE_CHARS: usize = 10;

/// Fixed, non-actionable wording sent to the other party on a graceful
/// exit. Deliberately names no one and asks for nothing.
const GRACEFUL_EXIT_TITLE: &str = "Relationship ended";
const GRACEFUL_EXIT_BODY: &str =
    "The other person has respectfully closed this chapter. Wishing you both well.";

/// Owns every transition out of `Active`. Matches are created by the
/// matching service and from then on only this service mutates them.
pub struct RelationshipTransitionService {
    matches: Arc<dyn MatchStore>,
    social: Arc<dyn SocialStore>,
    trust: Arc<dyn TrustSafetyStore>,
    clock: Arc<dyn Clock>,
}

impl RelationshipTransitionService {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        social: Arc<dyn SocialStore>,
        trust: Arc<dyn TrustSafetyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { matches, social, trust, clock }
    }

    /// Proposes moving an active match to the friend zone. The recipient
    /// gets one notification; the match itself does not change until they
    /// respond.
    pub fn propose_friend_zone(
        &self,
        from: Uuid,
        to: Uuid,
        message: &str,
    ) -> EngineResult<FriendRequest> {
        let m = self
            .matches
            .get_by_users(from, to)?
            .ok_or_else(|| EngineError::validation("an active match is required"))?;
        if !m.is_active() {
            return Err(EngineError::validation("an active match is required"));
        }
        if self.social.pending_request_between(from, to)?.is_some() {
            return Err(EngineError::validation(
                "a friend request is already pending between these users",
            ));
        }
        let trimmed = message.trim();
        if trimmed.chars().count() < MIN_FRIEND_MESSAGE_CHARS {
            return Err(EngineError::validation(format!(
                "friend-zone message must be at least {MIN_FRIEND_MESSAGE_CHARS} characters"
            )));
        }

        let now = self.clock.now();
        let request = FriendRequest::new(from, to, trimmed.to_string(), now);
        self.social.save_friend_request(&request)?;
        self.social.queue_notification(&Notification::new(
            to,
            NotificationKind::FriendRequest,
            "New friend request",
            "Someone wants to move your match to the friend zone.",
            now,
        ))?;

        tracing::info!(request = %request.id, "friend-zone proposed");
        Ok(request)
    }

    /// Resolves a pending friend request. Accepting moves the match to
    /// `Friends`; declining unmatches it, ended by the responder. Either
    /// way the conversation is archived and the proposer is notified.
    pub fn respond_to_friend_request(
        &self,
        request_id: Uuid,
        responder: Uuid,
        accept: bool,
    ) -> EngineResult<FriendRequest> {
        let mut request = self
            .social
            .get_friend_request(request_id)?
            .ok_or_else(|| EngineError::validation("friend request not found"))?;
        if request.to != responder {
            return Err(EngineError::validation(
                "only the recipient can respond to a friend request",
            ));
        }
        if !request.is_pending() {
            return Err(EngineError::validation("request is no longer pending"));
        }

        let mut m = self
            .matches
            .get_by_users(request.from, request.to)?
            .ok_or_else(|| EngineError::validation("no match exists for this request"))?;

        let now = self.clock.now();
        if accept {
            m.to_friends()?;
            request.status = FriendRequestStatus::Accepted;
        } else {
            m.unmatch(responder, now)?;
            request.status = FriendRequestStatus::Declined;
        }
        request.responded_at = Some(now);

        self.matches.save(&m)?;
        self.social.update_friend_request(&request)?;
        let reason = if accept { EndReason::FriendZone } else { EndReason::Unmatch };
        self.social.archive_conversation(request.from, request.to, reason)?;

        let (kind, title, body) = if accept {
            (
                NotificationKind::FriendRequestAccepted,
                "Friend request accepted",
                "Your match moved to the friend zone.",
            )
        } else {
            (
                NotificationKind::FriendRequestDeclined,
                "Friend request declined",
                "Your match chose not to move to the friend zone.",
            )
        };
        self.social
            .queue_notification(&Notification::new(request.from, kind, title, body, now))?;

        tracing::info!(request = %request.id, accepted = accept, "friend request resolved");
        Ok(request)
    }

    /// Ends an active match or friendship on good terms. Calling it again
    /// after it already succeeded is a no-op, so the other party is
    /// notified exactly once. A blocked relationship cannot be exited.
    pub fn graceful_exit(&self, initiator: Uuid, other: Uuid) -> EngineResult<()> {
        let mut m = self
            .matches
            .get_by_users(initiator, other)?
            .ok_or_else(|| EngineError::validation("no relationship exists between these users"))?;

        match m.state {
            MatchState::GracefulExit => return Ok(()),
            MatchState::Blocked => return Err(EngineError::BlockedRelationship),
            _ => {}
        }

        let now = self.clock.now();
        m.graceful_exit(initiator, now)?;
        self.matches.save(&m)?;
        self.social
            .archive_conversation(initiator, other, EndReason::GracefulExit)?;
        self.social.queue_notification(&Notification::new(
            other,
            NotificationKind::GracefulExit,
            GRACEFUL_EXIT_TITLE,
            GRACEFUL_EXIT_BODY,
            now,
        ))?;

        tracing::info!(match_id = %m.id, "graceful exit");
        Ok(())
    }

    /// Blocks the other party: the match moves to its final state, the
    /// conversation is archived, the block relation is recorded, and the
    /// blocked user is told nothing.
    pub fn block(&self, user: Uuid, target: Uuid) -> EngineResult<()> {
        let mut m = self
            .matches
            .get_by_users(user, target)?
            .ok_or_else(|| EngineError::validation("no relationship exists between these users"))?;

        if m.state == MatchState::Blocked {
            return Ok(());
        }

        m.block(user, self.clock.now())?;
        self.matches.save(&m)?;
        self.social.archive_conversation(user, target, EndReason::Block)?;
        self.trust.record_block(user, target)?;

        tracing::info!(match_id = %m.id, "match blocked");
        Ok(())
    }

    /// Pending friend requests addressed to `user`, oldest first.
    pub fn pending_friend_requests(&self, user: Uuid) -> EngineResult<Vec<FriendRequest>> {
        Ok(self.social.pending_requests_for(user)?)
    }
}
