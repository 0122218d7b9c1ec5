//! Prompt builders for the Gemini content and vision models

/// System instruction for the text/content model
pub const CONTENT_SYSTEM: &str = "You are the content generator, who can deliver the required information based on the transcript given.";

/// System instruction for the vision model
pub const VISION_SYSTEM: &str = "You are a very good video analyzer and information extractor from video";

/// Fixed instruction for the visual-analysis call over an uploaded video
pub const VISUAL_ANALYSIS: &str = "Analyze this video content for entertainment purposes. Return STRICT JSON format with: \
{genre: string, mood: string, similar_content_suggestions: array of strings, key_elements: array of strings, audience_options: array of strings}";

/// Default summary prompt when the analysis did not suggest one
pub const DEFAULT_SUMMARY_PROMPT: &str = "Provide a detailed summary of the video content";

/// Summary prompt for entertainment analyses
pub const ENTERTAINMENT_SUMMARY_PROMPT: &str = "Provide a comprehensive entertainment analysis summary";

/// Knowledge-analysis prompt over a translated transcript
pub fn knowledge_analysis(transcript: &str) -> String {
    format!(
        "Analyze this transcript for knowledge content. Return JSON with:\n\
         {{\n\
         \x20 \"video_type\": string,\n\
         \x20 \"custom_prompt\": string,\n\
         \x20 \"audience_options\": array of strings\n\
         }}\n\
         Transcript: {}",
        transcript
    )
}

/// Summary prompt: base instruction, audience, and source content
pub fn summary(instruction: &str, audience: &str, content: &str) -> String {
    format!(
        "Prompt: {}\nwith respect to the audience: {}\nContent: {}",
        instruction, audience, content
    )
}

/// Learning-roadmap prompt over a translated transcript
pub fn roadmap(audience: &str, transcript: &str) -> String {
    format!(
        "Create a learning roadmap for {}\nTranscript: {}",
        audience, transcript
    )
}

/// Chat prompt grounding the question in the session context
pub fn chat(audience: &str, question: &str, context: &str) -> String {
    format!(
        "Answer the question from the given context with respect to the given audience.\n\
         Audience: {}\n\
         Question: {}\n\
         Context: {}",
        audience, question, context
    )
}
