//! Streak and session-count tracking.
//!
//! A pure state machine over `(last_session_at, streak_count,
//! longest_streak)`, advanced once per completed turn, plus a
//! best-effort profile write that never fails the turn.

use chrono::{DateTime, Duration, Utc};

use wp_domain::model::{EngagementStats, Profile};
use wp_store::ContextStore;

/// Sessions within this window keep the streak unchanged.
const SAME_DAY_HOURS: i64 = 24;

/// Sessions within this window (but past the same-day window) extend the
/// streak; anything later resets it.
const STREAK_WINDOW_HOURS: i64 = 48;

/// Advance the engagement state for one completed turn.
///
/// Transition table over the gap since the last session:
/// - no prior session, or gap > 48h  => streak resets to 1
/// - 24h <= gap <= 48h               => streak + 1
/// - gap < 24h                       => streak unchanged
///
/// `longest_streak` is monotonic non-decreasing; `total_sessions` and
/// `last_session_at` advance unconditionally.
pub fn advance(profile: Option<&Profile>, now: DateTime<Utc>) -> EngagementStats {
    let (last_session_at, streak, longest, total) = profile
        .map(|p| {
            (
                p.last_session_at,
                p.streak_count,
                p.longest_streak,
                p.total_sessions,
            )
        })
        .unwrap_or((None, 0, 0, 0));

    let streak_count = match last_session_at {
        None => 1,
        Some(last) => {
            let gap = now - last;
            if gap < Duration::hours(SAME_DAY_HOURS) {
                streak
            } else if gap <= Duration::hours(STREAK_WINDOW_HOURS) {
                streak + 1
            } else {
                1
            }
        }
    };

    EngagementStats {
        streak_count,
        longest_streak: longest.max(streak_count),
        total_sessions: total + 1,
        last_session_at: now,
    }
}

/// Advance and persist the engagement state. Best-effort: a failed write
/// is logged and swallowed.
pub async fn record_session(
    store: &dyn ContextStore,
    user_id: &str,
    profile: Option<&Profile>,
    now: DateTime<Utc>,
) {
    let stats = advance(profile, now);
    if let Err(e) = store.update_engagement(user_id, &stats).await {
        tracing::warn!(user_id, error = %e, "engagement update failed, turn unaffected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-08-06T12:00:00Z".parse().unwrap()
    }

    fn profile(last_hours_ago: Option<i64>, streak: u32, longest: u32, total: u32) -> Profile {
        Profile {
            id: "u1".into(),
            email: None,
            display_name: None,
            coaching_style_preference: None,
            life_context: None,
            values: vec![],
            selected_coach_id: None,
            streak_count: streak,
            longest_streak: longest,
            total_sessions: total,
            last_session_at: last_hours_ago.map(|h| now() - Duration::hours(h)),
        }
    }

    #[test]
    fn no_profile_starts_a_streak() {
        let stats = advance(None, now());
        assert_eq!(stats.streak_count, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.last_session_at, now());
    }

    #[test]
    fn no_prior_session_resets_to_one() {
        let p = profile(None, 7, 9, 40);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 1);
        assert_eq!(stats.longest_streak, 9);
        assert_eq!(stats.total_sessions, 41);
    }

    #[test]
    fn gap_under_24h_keeps_streak() {
        let p = profile(Some(12), 3, 5, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 3);
        assert_eq!(stats.total_sessions, 11);
    }

    #[test]
    fn gap_of_exactly_24h_increments() {
        let p = profile(Some(24), 3, 5, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 4);
    }

    #[test]
    fn gap_between_24_and_48h_increments() {
        let p = profile(Some(36), 3, 5, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 4);
    }

    #[test]
    fn gap_of_exactly_48h_increments() {
        let p = profile(Some(48), 3, 5, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 4);
    }

    #[test]
    fn gap_over_48h_resets() {
        let p = profile(Some(49), 6, 6, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 1);
        assert_eq!(stats.longest_streak, 6);
    }

    #[test]
    fn longest_streak_is_monotonic() {
        let p = profile(Some(30), 5, 5, 10);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 6);
        assert_eq!(stats.longest_streak, 6);

        let p = profile(Some(100), 6, 6, 11);
        let stats = advance(Some(&p), now());
        assert_eq!(stats.streak_count, 1);
        assert_eq!(stats.longest_streak, 6, "never decreases");
    }

    #[test]
    fn total_sessions_always_increments() {
        for hours in [1, 24, 36, 48, 72] {
            let p = profile(Some(hours), 2, 2, 7);
            let stats = advance(Some(&p), now());
            assert_eq!(stats.total_sessions, 8, "gap {hours}h");
        }
    }
}
