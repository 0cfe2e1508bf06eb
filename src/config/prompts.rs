//! Analysis prompt templates for Blikk.
//!
//! Prompts can be customized by placing text files (`full.txt`,
//! `transcript.txt`, `visual.txt`) in the custom prompts directory.

use crate::analysis::AnalysisMode;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prompt templates for each built-in analysis mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub full: String,
    pub transcript: String,
    pub visual: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            full: r#"Analyze this video comprehensively and provide:

1. TRANSCRIPT: Full transcript of all spoken words and audio content
2. VISUAL SUMMARY: Describe the key visual elements, scenes, and actions
3. KEY MOMENTS: Identify important timestamps and what happens at each
4. TOPICS: Main topics and themes discussed or shown
5. PEOPLE: Describe any people visible (appearance, actions, roles)
6. TEXT: Any visible text, captions, or written content
7. OBJECTS: Important objects, products, or items shown
8. SETTING: Environment, location, and context
9. MOOD/TONE: Overall atmosphere and emotional tone
10. INSIGHTS: Key takeaways, insights, or conclusions

Provide detailed, structured output."#
                .to_string(),

            transcript: r#"Transcribe all spoken words in this video. Provide:

1. FULL TRANSCRIPT: Complete word-for-word transcription with timestamps
2. SPEAKERS: Identify different speakers if multiple people speak
3. KEY TOPICS: Main topics discussed
4. SUMMARY: Brief summary of what was said

Format the transcript clearly with timestamps."#
                .to_string(),

            visual: r#"Analyze the visual content of this video. Provide:

1. SCENE BREAKDOWN: Describe each major scene or segment
2. VISUAL ELEMENTS: Key visual elements, objects, people, settings
3. ACTIONS: What actions and events occur
4. TEXT ON SCREEN: Any text, captions, or graphics shown
5. VISUAL STYLE: Cinematography, editing style, visual quality
6. KEY FRAMES: Describe important moments or frames
7. OVERALL NARRATIVE: Visual story being told

Focus only on what can be seen, not audio content."#
                .to_string(),
        }
    }
}

impl AnalysisPrompts {
    /// Load prompts, overriding defaults from a custom directory if given.
    pub fn load(custom_dir: Option<&str>) -> Result<Self> {
        let mut prompts = Self::default();

        if let Some(dir) = custom_dir {
            let dir = Path::new(dir);
            for (name, slot) in [
                ("full.txt", &mut prompts.full),
                ("transcript.txt", &mut prompts.transcript),
                ("visual.txt", &mut prompts.visual),
            ] {
                let path = dir.join(name);
                if path.exists() {
                    *slot = std::fs::read_to_string(&path)?;
                }
            }
        }

        Ok(prompts)
    }

    /// The prompt used for a given analysis mode.
    ///
    /// A custom prompt always wins; the Custom mode has no template of its
    /// own, so a missing custom prompt falls back to the full template.
    pub fn for_mode<'a>(&'a self, mode: AnalysisMode, custom: Option<&'a str>) -> &'a str {
        if let Some(prompt) = custom {
            return prompt;
        }
        match mode {
            AnalysisMode::Full | AnalysisMode::Custom => &self.full,
            AnalysisMode::Transcript => &self.transcript,
            AnalysisMode::Visual => &self.visual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_cover_all_modes() {
        let prompts = AnalysisPrompts::default();
        assert!(prompts.full.contains("TRANSCRIPT"));
        assert!(prompts.transcript.contains("word-for-word"));
        assert!(prompts.visual.contains("not audio content"));
    }

    #[test]
    fn test_for_mode_selects_template() {
        let prompts = AnalysisPrompts::default();
        assert_eq!(prompts.for_mode(AnalysisMode::Full, None), prompts.full);
        assert_eq!(
            prompts.for_mode(AnalysisMode::Transcript, None),
            prompts.transcript
        );
        assert_eq!(prompts.for_mode(AnalysisMode::Visual, None), prompts.visual);
    }

    #[test]
    fn test_custom_prompt_wins_over_template() {
        let prompts = AnalysisPrompts::default();
        assert_eq!(
            prompts.for_mode(AnalysisMode::Visual, Some("describe the cat")),
            "describe the cat"
        );
    }

    #[test]
    fn test_load_with_custom_dir_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("visual.txt"), "custom visual prompt").unwrap();

        let prompts = AnalysisPrompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.visual, "custom visual prompt");
        // Untouched templates keep their defaults
        assert!(prompts.full.contains("TRANSCRIPT"));
    }
}
