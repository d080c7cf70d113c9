// src/chatbox/prompts.rs

//! Prompt texts. Placeholders in `{braces}` are filled by the prompt builder.

pub const SYSTEM_PROMPT_NEW: &str = "You are a patient math tutor meeting a new learner. \
Write clear, friendly multiple-choice questions that gauge what the learner already knows. \
Always answer with valid JSON only, no prose and no markdown fences. \
Write math in LaTeX and escape every backslash as required inside JSON strings.";

pub const SYSTEM_PROMPT_PRACTICE: &str = "You are a math tutor running a practice session. \
Write multiple-choice questions that build fluency step by step, from easy to moderate. \
Always answer with valid JSON only, no prose and no markdown fences. \
Write math in LaTeX and escape every backslash as required inside JSON strings.";

pub const SYSTEM_PROMPT_EXAM: &str = "You are a math examiner preparing a formal test. \
Write rigorous multiple-choice questions with exactly one correct option and plausible distractors. \
Always answer with valid JSON only, no prose and no markdown fences. \
Write math in LaTeX and escape every backslash as required inside JSON strings.";

pub const SYSTEM_PROMPT_GRADER: &str = "You are a math teacher grading a learner's quiz. \
Be accurate and encouraging. \
Always answer with valid JSON only, no prose and no markdown fences. \
Write math in LaTeX and escape every backslash as required inside JSON strings.";

pub const QUESTION_SHAPE: &str = r#"Return a JSON array. Each element must have exactly these fields:
{"question_number": <1-based integer>, "question": "<text>", "answers": [{"label": "A", "content": "<text>"}, {"label": "B", "content": "<text>"}, {"label": "C", "content": "<text>"}, {"label": "D", "content": "<text>"}], "right_answer": "<label of the correct option>", "duration": <suggested seconds>}"#;

pub const GRADING_SHAPE: &str = r#"Return a JSON object with exactly these fields:
{"total_questions": <integer>, "correct_number": <integer>, "score_percentage": <integer 0-100>, "ai_review": "<feedback for the learner: strengths, mistakes, what to study next>", "ai_detect_grade": "<the school grade the learner is performing at, e.g. Grade 3>"}"#;

pub const GENERATE_NEW_TEMPLATE: &str = "Create {count} {subject} questions for a new learner in {grade}, {semester}. \
Start with the most basic skills of that grade and finish with one question slightly above it, \
so the answers reveal the learner's real level.\n{question_shape}";

pub const GENERATE_PRACTICE_TEMPLATE: &str = "Create {count} {subject} practice questions for a learner in {grade}, {semester}. \
Cover the core topics of that semester, ordered from easy to moderate.\n{question_shape}";

pub const GENERATE_EXAM_TEMPLATE: &str = "Create {count} {subject} exam questions for a learner in {grade}, {semester}. \
Cover the whole semester syllabus with a realistic exam difficulty mix.\n{question_shape}";

pub const SUBMIT_TEMPLATE: &str = "Grade this quiz submission.\n\
Questions (JSON):\n{questions}\n\
Learner answers (JSON):\n{answers}\n\
Compare each answer with right_answer, then review the learner's work.\n{grading_shape}";

pub const REINFORCE_TEMPLATE: &str = "A learner assessed at {detected_grade} finished the quiz below.\n\
Questions (JSON):\n{questions}\n\
Learner answers (JSON):\n{answers}\n\
Teacher review:\n{ai_review}\n\
Create {count} new {subject} questions that target the weaknesses named in the review. \
Do not repeat the original questions.\n{question_shape}";

pub const SUBMIT_REINFORCE_TEMPLATE: &str = "Grade this reinforcement quiz from a learner in {grade}, {semester}.\n\
Earlier review of this learner:\n{ai_review}\n\
Reinforcement questions (JSON):\n{questions}\n\
Learner answers (JSON):\n{answers}\n\
Say whether the weaknesses from the earlier review improved.\n{grading_shape}";

pub const EXTRA_INSTRUCTIONS: &str = "\nAdditional instructions from the learner:\n{message}";

