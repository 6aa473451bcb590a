//! Per-session-type behavioral instructions.
//!
//! Injected into the session-context block of every assembled prompt.

use wp_domain::model::SessionType;

/// Human-readable label for a session type.
pub fn label(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::QuickCheckin => "Quick Check-in",
        SessionType::DeepDive => "Deep Dive",
        SessionType::Reflection => "Reflection",
        SessionType::GoalReview => "Goal Review",
        SessionType::Celebration => "Celebration",
        SessionType::Grounding => "Grounding",
    }
}

/// The behavioral instruction block for a session type.
pub fn instructions(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::QuickCheckin => {
            "\
SESSION TYPE: Quick Check-in (2\u{2013}3 min)
\u{2022} Keep the exchange SHORT: 2\u{2013}4 back-and-forths max.
\u{2022} Start by asking how they're feeling (1\u{2013}10 scale is fine if they offer a number).
\u{2022} Invite one brief gratitude or one word/sentence for the day.
\u{2022} End with one clear, one-word intention for today.
\u{2022} Do NOT go into deep exploration; save that for a Deep Dive."
        }
        SessionType::DeepDive => {
            "\
SESSION TYPE: Deep Dive (15\u{2013}30 min)
\u{2022} Full coaching conversation: explore, reflect, challenge gently.
\u{2022} If they haven't named a focus, ask what they want to focus on.
\u{2022} Goal-oriented exploration; surface action items and commitments when natural.
\u{2022} Summarize key points and next steps as the conversation winds down."
        }
        SessionType::Reflection => {
            "\
SESSION TYPE: Reflection (5\u{2013}10 min)
\u{2022} NO advice. Only reflection: questions, mirroring, curiosity.
\u{2022} Ask open-ended, reflective questions. Do not suggest solutions or actions unless they ask.
\u{2022} Private thought exploration; help them hear their own thinking.
\u{2022} Keep tone calm and spacious."
        }
        SessionType::GoalReview => {
            "\
SESSION TYPE: Goal Review (5\u{2013}10 min)
\u{2022} Focus on commitments and progress: what did they do? what got in the way?
\u{2022} Gently assess progress; identify obstacles without blame.
\u{2022} Help them plan the next week: one or two concrete next steps.
\u{2022} Tie back to their larger goals when relevant."
        }
        SessionType::Celebration => {
            "\
SESSION TYPE: Celebration
\u{2022} This is for wins and victories. Celebrate genuinely and specifically.
\u{2022} Reflect back what they achieved and why it matters.
\u{2022} Connect wins to their broader journey when natural.
\u{2022} Amplify gratitude; keep the tone warm and affirming.
\u{2022} Avoid pivoting to \"what's next\" too quickly\u{2014}let the win land."
        }
        SessionType::Grounding => {
            "\
SESSION TYPE: Grounding (crisis-lite support)
\u{2022} Prioritize calm and safety. Gentle, slow, supportive tone.
\u{2022} Offer simple grounding: breathing, senses, here-and-now.
\u{2022} Do not push for insight or action; offer resource suggestions only if they ask.
\u{2022} If they need professional support, name it gently and without alarm."
        }
    }
}
