// Prompt templates for the generation module.
// Placeholders in braces are replaced with `str::replace` before sending.

/// Quiz from an exam paper.
/// Replace: {num_questions}, {difficulty}, {subject}, {paper_text}, {accuracy_instruction}
pub const QUIZ_FROM_PAPER_TEMPLATE: &str = r#"{accuracy_instruction}

You are given the text of a past university exam paper for the subject "{subject}".
Write {num_questions} multiple-choice practice questions of {difficulty} difficulty that test
the same concepts as the paper. Do NOT copy the paper's questions verbatim.

Return a JSON object with this EXACT schema:
{
  "title": "Data Structures Practice Quiz",
  "description": "One sentence describing what the quiz covers",
  "questions": [
    {
      "id": "q1",
      "question": "Which traversal of a binary search tree yields keys in sorted order?",
      "options": ["Pre-order", "In-order", "Post-order", "Level-order"],
      "correct_answer": 1,
      "explanation": "In-order visits left subtree, node, then right subtree.",
      "difficulty": "{difficulty}",
      "points": 10,
      "topic": "Trees"
    }
  ]
}

Rules:
1. Exactly four options per question
2. `correct_answer` is the zero-based index of the correct option
3. Every question has a one or two sentence explanation

EXAM PAPER:
{paper_text}"#;

/// Quiz from a free-form topic.
/// Replace: {num_questions}, {difficulty}, {topic}, {category}, {accuracy_instruction}
pub const QUIZ_FROM_TOPIC_TEMPLATE: &str = r#"{accuracy_instruction}

Write {num_questions} multiple-choice questions of {difficulty} difficulty about "{topic}"
(category: {category}).

Return a JSON object with this EXACT schema:
{
  "title": "Quiz title",
  "description": "One sentence describing what the quiz covers",
  "questions": [
    {
      "id": "q1",
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": 0,
      "explanation": "Why the correct option is right",
      "difficulty": "{difficulty}",
      "points": 10,
      "topic": "Sub-topic the question covers"
    }
  ]
}

Rules:
1. Exactly four options per question, only one of them correct
2. `correct_answer` is the zero-based index of the correct option
3. Vary the position of the correct option across questions"#;

/// Knowledge discovery cards.
/// Replace: {count}, {category}, {accuracy_instruction}
pub const DISCOVERY_CARDS_TEMPLATE: &str = r#"{accuracy_instruction}

Suggest {count} surprising, bite-sized topics a curious engineering student could explore in the
category "{category}". Each card should make the reader want to learn more.

Return a JSON object with this EXACT schema:
{
  "cards": [
    {
      "id": "card-1",
      "title": "Why the Tacoma Narrows Bridge Twisted Apart",
      "summary": "Two or three sentences that hook the reader.",
      "category": "{category}",
      "difficulty": "beginner",
      "read_time_minutes": 3,
      "tags": ["resonance", "civil engineering"],
      "fun_fact": "A single memorable fact"
    }
  ]
}

`difficulty` is one of "beginner", "intermediate", "advanced"."#;

/// Expanded explanation for a single discovery card.
/// Replace: {title}, {category}, {summary}, {accuracy_instruction}
pub const DISCOVERY_DETAILS_TEMPLATE: &str = r#"{accuracy_instruction}

Write an in-depth but approachable explanation of "{title}" (category: {category}).
Context the reader has already seen: {summary}

Return a JSON object with this EXACT schema:
{
  "title": "{title}",
  "overview": "A short paragraph introducing the topic",
  "sections": [
    {"heading": "Section heading", "content": "One or two paragraphs"}
  ],
  "key_points": ["Short takeaway"],
  "related_topics": ["Another topic worth exploring"]
}

Write three to five sections."#;

/// Course outline.
/// Replace: {name}, {description}, {category}, {level}, {no_of_chapters}, {include_video}, {accuracy_instruction}
pub const COURSE_LAYOUT_TEMPLATE: &str = r#"{accuracy_instruction}

Design the outline of an online course.

Course name: {name}
Description: {description}
Category: {category}
Level: {level}
Number of chapters: {no_of_chapters}
Include video: {include_video}

Return a JSON object with this EXACT schema:
{
  "course_name": "{name}",
  "description": "Two sentence course description",
  "category": "{category}",
  "level": "{level}",
  "banner_image_prompt": "A short prompt describing a flat illustration for the course banner",
  "chapters": [
    {
      "chapter_name": "Chapter title",
      "about": "One sentence on what the chapter covers",
      "duration": "45 minutes",
      "topics": ["Topic one", "Topic two", "Topic three"]
    }
  ]
}

Write exactly {no_of_chapters} chapters with three to six topics each."#;
