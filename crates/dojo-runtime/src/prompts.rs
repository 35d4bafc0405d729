//! Prompt construction for every generation request the engine makes.
//!
//! Each builder renders a complete prompt asking for a JSON-shaped answer;
//! the decode boundary in dojo-core handles whatever actually comes back.

use dojo_core::config::InterviewConfig;
use dojo_core::constants::{HISTORY_WINDOW, MAX_QUESTIONS};
use dojo_core::session::Session;
use dojo_core::transcript::{format_history, format_transcript};

/// Per-role interviewer guidance, keyed by slugified role name.
fn role_context(role: &str) -> &'static str {
    let slug = role.to_lowercase().replace(char::is_whitespace, "-");
    match slug.as_str() {
        "software-engineer" => {
            "ROLE: Software Engineer Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Technical skills: coding, system design, algorithms, debugging\n\
             - Problem-solving approach and analytical thinking\n\
             - Communication of technical concepts\n\
             - Collaboration and code review experience\n\
             QUESTION TYPES TO USE:\n\
             - \"Walk me through how you would design...\"\n\
             - \"Tell me about a challenging bug you debugged...\"\n\
             - \"Describe a technical decision you made and its tradeoffs\"\n\
             - System design scenarios appropriate to level"
        }
        "sales" => {
            "ROLE: Sales Position Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Relationship building and rapport\n\
             - Objection handling and negotiation\n\
             - Pipeline management and closing techniques\n\
             - Resilience and handling rejection\n\
             QUESTION TYPES TO USE:\n\
             - \"Walk me through your sales process...\"\n\
             - \"Tell me about a deal you lost and what you learned...\"\n\
             - \"How do you handle price objections?\""
        }
        "retail-associate" => {
            "ROLE: Retail Associate Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Customer service orientation\n\
             - Problem resolution skills\n\
             - Teamwork and flexibility\n\
             - Cash handling and attention to detail\n\
             QUESTION TYPES TO USE:\n\
             - \"How would you handle an upset customer?\"\n\
             - \"Tell me about a time you went above and beyond...\"\n\
             - Situational: handling returns, difficult customers"
        }
        "product-manager" => {
            "ROLE: Product Manager Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Strategic thinking and prioritization\n\
             - User empathy and customer focus\n\
             - Data-driven decision making\n\
             - Communication and stakeholder management\n\
             QUESTION TYPES TO USE:\n\
             - \"How would you prioritize these features?\"\n\
             - \"Walk me through a product you launched...\"\n\
             - Product sense: \"How would you improve X product?\""
        }
        "marketing" => {
            "ROLE: Marketing Position Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Campaign strategy and execution\n\
             - Analytics and ROI measurement\n\
             - Creativity and brand thinking\n\
             - Channel expertise (digital, content, etc.)\n\
             QUESTION TYPES TO USE:\n\
             - \"Walk me through a successful campaign...\"\n\
             - \"How do you measure marketing effectiveness?\"\n\
             - Creative brief: \"How would you market X to Y audience?\""
        }
        "data-analyst" => {
            "ROLE: Data Analyst Interview\n\
             KEY AREAS TO ASSESS:\n\
             - SQL and data manipulation skills\n\
             - Statistical analysis and interpretation\n\
             - Data visualization and storytelling\n\
             - Business acumen and stakeholder communication\n\
             QUESTION TYPES TO USE:\n\
             - \"Walk me through your analysis process...\"\n\
             - \"How would you investigate a sudden drop in metric X?\"\n\
             - \"How do you handle messy or incomplete data?\""
        }
        "customer-support" => {
            "ROLE: Customer Support Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Empathy and patience\n\
             - Problem-solving under pressure\n\
             - Communication clarity\n\
             - De-escalation skills\n\
             QUESTION TYPES TO USE:\n\
             - \"How do you handle an angry customer?\"\n\
             - \"Tell me about a complex issue you resolved...\"\n\
             - Role-play: difficult customer scenarios"
        }
        _ => {
            "ROLE: General Interview\n\
             KEY AREAS TO ASSESS:\n\
             - Communication and interpersonal skills\n\
             - Problem-solving and critical thinking\n\
             - Adaptability and learning agility\n\
             - Relevant experience and achievements\n\
             QUESTION TYPES TO USE:\n\
             - Behavioral questions using STAR method\n\
             - Situational questions about challenges\n\
             - Questions about career goals and motivation"
        }
    }
}

/// Opening prompt: introduce the interviewer and ask the first question.
pub(crate) fn start_prompt(config: &InterviewConfig) -> String {
    let focus = if config.focus_areas.is_empty() {
        String::new()
    } else {
        format!("Focus areas: {}\n", config.focus_areas.join(", "))
    };
    format!(
        "You are an expert interviewer conducting a {role} interview.\n\
         Candidate experience level: {level}\n\
         {focus}\n\
         {context}\n\n\
         Start the interview naturally:\n\
         1. Briefly introduce yourself as the interviewer and greet the candidate warmly\n\
         2. Ask your FIRST interview question - an open-ended question appropriate for their experience level\n\n\
         Keep your response conversational and under 100 words. Do NOT list multiple questions.\n\
         Return your response in this JSON format:\n\
         {{\n  \
           \"message\": \"your spoken response\",\n  \
           \"metadata\": {{\n    \
             \"questionType\": \"behavioral|technical|situational\",\n    \
             \"skillBeingAssessed\": \"skill name\",\n    \
             \"difficultyLevel\": 1-5\n  \
           }}\n\
         }}",
        role = config.role,
        level = config.experience_level.as_str(),
        context = role_context(&config.role),
    )
}

/// Turn continuation: acknowledge, then follow up or advance.
pub(crate) fn continuation_prompt(session: &Session, user_message: &str) -> String {
    let history = format_history(&session.messages, HISTORY_WINDOW);
    let topics = if session.metadata.topics_covered.is_empty() {
        "none yet".to_owned()
    } else {
        session.metadata.topics_covered.join(", ")
    };
    let final_clause = if session.question_count >= MAX_QUESTIONS - 1 {
        "\nThis is the FINAL question. After their response, wrap up the interview warmly.\n"
    } else {
        ""
    };
    format!(
        "You are an expert {role} interviewer. You must act like a real human interviewer.\n\n\
         CONVERSATION HISTORY:\n{history}\n\n\
         CANDIDATE'S LATEST RESPONSE: \"{user_message}\"\n\n\
         INTERVIEW STATE:\n\
         - Question {current} of {max}\n\
         - Experience Level: {level}\n\
         - Previous topics covered: {topics}\n\n\
         YOUR TASK:\n\
         1. First, briefly acknowledge their answer (1 sentence max - be natural, not robotic)\n\
         2. If their answer was vague or incomplete, ask a FOLLOW-UP question to dig deeper\n\
         3. If their answer was good, move to a NEW question on a different topic/skill\n\
         4. Adapt difficulty based on their performance so far\n\
         {final_clause}\n\
         BE NATURAL - vary your responses.\n\n\
         Return JSON:\n\
         {{\n  \
           \"message\": \"your spoken response\",\n  \
           \"isFollowUp\": true/false,\n  \
           \"isComplete\": true/false,\n  \
           \"metadata\": {{\n    \
             \"questionType\": \"behavioral|technical|situational|follow-up\",\n    \
             \"skillBeingAssessed\": \"skill name\",\n    \
             \"responseQuality\": \"excellent|good|fair|needs-improvement\",\n    \
             \"topicsCovered\": [\"list\", \"of\", \"topics\"],\n    \
             \"difficultyLevel\": 1-5\n  \
           }}\n\
         }}",
        role = session.config.role,
        current = session.question_count + 1,
        max = MAX_QUESTIONS,
        level = session.config.experience_level.as_str(),
    )
}

/// Intent triage for the latest candidate message.
pub(crate) fn intent_prompt(message: &str, role: &str) -> String {
    format!(
        "Analyze this interview response:\n\
         \"{message}\"\n\n\
         Context: This is a {role} interview.\n\n\
         Determine:\n\
         1. Is the user confused or asking for help/clarification?\n\
         2. Is the response completely off-topic (not related to the interview at all)?\n\
         3. Is this a valid interview response (even if brief or imperfect)?\n\n\
         Return JSON only:\n\
         {{\n  \
           \"needsClarification\": boolean,\n  \
           \"isOffTopic\": boolean,\n  \
           \"isValidResponse\": boolean,\n  \
           \"reason\": \"brief explanation\"\n\
         }}"
    )
}

/// Rephrase the last question for a confused candidate.
pub(crate) fn clarification_prompt(user_message: &str, last_question: &str, role: &str) -> String {
    format!(
        "The interview candidate seems confused or needs clarification.\n\n\
         Their message: \"{user_message}\"\n\
         Last question asked: \"{last_question}\"\n\
         Role: {role}\n\n\
         Respond helpfully:\n\
         1. Acknowledge their confusion warmly\n\
         2. Rephrase or clarify the question in simpler terms\n\
         3. Optionally give a hint about what kind of answer you're looking for\n\n\
         Be encouraging, not condescending. Keep under 80 words.\n\n\
         Return JSON: {{ \"message\": \"your response\", \"metadata\": {{ \"action\": \"clarification\" }} }}"
    )
}

/// Steer an off-topic candidate back to the interview.
pub(crate) fn redirect_prompt(user_message: &str, role: &str) -> String {
    format!(
        "The interview candidate went off-topic.\n\
         Their message: \"{user_message}\"\n\
         Role: {role} interview\n\n\
         Gently redirect them back to the interview:\n\
         1. Briefly acknowledge what they said (don't ignore them)\n\
         2. Smoothly transition back to the interview\n\
         3. Either repeat your last question or ask a new one\n\n\
         Be friendly but professional. Keep under 80 words.\n\n\
         Return JSON: {{ \"message\": \"your response\", \"metadata\": {{ \"action\": \"redirect\" }} }}"
    )
}

/// Post-interview analysis over the full transcript.
pub(crate) fn feedback_prompt(session: &Session) -> String {
    format!(
        "You are an expert interview coach analyzing a completed {role} interview.\n\n\
         FULL INTERVIEW TRANSCRIPT:\n{transcript}\n\n\
         CANDIDATE INFO:\n\
         - Role: {role}\n\
         - Experience Level: {level}\n\n\
         Provide comprehensive, actionable feedback. Be specific - reference actual things they said.\n\n\
         Analyze and return JSON:\n\
         {{\n  \
           \"overallScore\": 1-10,\n  \
           \"summary\": \"2-3 sentence overall assessment\",\n  \
           \"strengths\": [{{ \"area\": \"...\", \"evidence\": \"...\", \"impact\": \"...\" }}],\n  \
           \"improvements\": [{{ \"area\": \"...\", \"issue\": \"...\", \"suggestion\": \"...\", \"example\": \"...\" }}],\n  \
           \"skillScores\": {{\n    \
             \"communication\": {{ \"score\": 1-10, \"notes\": \"brief note\" }},\n    \
             \"technicalKnowledge\": {{ \"score\": 1-10, \"notes\": \"brief note\" }},\n    \
             \"problemSolving\": {{ \"score\": 1-10, \"notes\": \"brief note\" }},\n    \
             \"cultureFit\": {{ \"score\": 1-10, \"notes\": \"brief note\" }},\n    \
             \"confidence\": {{ \"score\": 1-10, \"notes\": \"brief note\" }}\n  \
           }},\n  \
           \"starMethodUsage\": {{ \"used\": boolean, \"feedback\": \"advice on using STAR method\" }},\n  \
           \"topPriorityAction\": \"The ONE thing they should focus on improving first\",\n  \
           \"interviewerPerspective\": \"What a real interviewer would likely think about this candidate\"\n\
         }}\n\n\
         Be encouraging but honest. Specific feedback > generic praise.",
        role = session.config.role,
        level = session.config.experience_level.as_str(),
        transcript = format_transcript(&session.messages),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
