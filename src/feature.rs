use serde::Serialize;

use crate::gemini::{InlineImage, ModelRequest};
use crate::upload::UploadedFile;

const FACE_SWAP_PROMPT: &str = "You are an expert in face analysis and image composition. Analyze these two images for a face swap operation:

IMAGE 1 (Source - Face to extract):
- Analyze facial features, proportions, and characteristics
- Note skin tone, lighting conditions, and expression
- Identify key facial landmarks (eyes, nose, mouth, jaw)

IMAGE 2 (Target - Image to apply face to):
- Identify where the face should be placed
- Note the lighting and background
- Assess the body position and angle

Task: Provide a detailed technical analysis for performing a seamless face swap that includes:
1. Facial proportions and alignment requirements
2. Lighting and color correction needed
3. Blending strategy for natural appearance
4. Any challenges and how to overcome them
5. Step-by-step approach for the face swap

Focus on creating a natural-looking result that maintains both facial identity and image coherence.";

const GENERATION_PLAN_HEAD: &str = "You are an expert in AI image generation and identity preservation. Your task is to analyze a reference image and create a comprehensive generation plan.

REFERENCE IMAGE ANALYSIS:
1. Facial Features:
   - Analyze and describe key facial characteristics (face shape, features, expressions)
   - Note skin tone, hair color, and distinctive features
   - Identify eye color, facial proportions, and unique markings

2. Physical Characteristics:
   - Body type and posture
   - Typical clothing style preferences
   - Any distinctive physical traits

3. Identity Preservation Requirements:
   - The person must remain recognizable in the generated image
   - Preserve all key identifying facial features
   - Maintain consistent skin tone and hair characteristics

GENERATION TASK:
";

const GENERATION_PLAN_TAIL: &str = "

YOUR INSTRUCTIONS:
1. Generate a completely new scene as described in the prompt
2. Preserve the facial identity and key physical characteristics from the reference
3. Maintain natural lighting and realistic proportions
4. Ensure high quality and professional appearance
5. Blend the preserved identity seamlessly into the new scene
6. Provide 5-7 specific technical steps for how to accomplish this generation

TECHNICAL APPROACH:
- Provide detailed guidance on:
  * Facial feature extraction and preservation
  * Scene composition and positioning
  * Lighting and color matching strategies
  * Blending techniques for seamless integration
  * Quality assurance checks

Return a detailed technical specification that could guide an AI image generation system.";

pub const SOURCE_FIELD: &str = "sourceImage";
pub const TARGET_FIELD: &str = "targetImage";
pub const REFERENCE_FIELD: &str = "referenceImage";
pub const PROMPT_FIELD: &str = "prompt";

/// Longest analysis excerpt returned by prompt generation, in characters.
const GENERATION_ANALYSIS_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    FaceSwap,
    PromptGeneration,
}

impl Feature {
    pub fn slug(self) -> &'static str {
        match self {
            Feature::FaceSwap => "face-swap",
            Feature::PromptGeneration => "prompt-gen",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Feature::FaceSwap => "gemini-2.5-flash-image",
            Feature::PromptGeneration => "gemini-2.5-flash",
        }
    }

    pub fn content_disposition(self) -> &'static str {
        match self {
            Feature::FaceSwap => "attachment; filename=\"face-swapped.png\"",
            Feature::PromptGeneration => "attachment; filename=\"generated-image.png\"",
        }
    }

    /// Response header carrying the base64 analysis text.
    pub fn analysis_header(self) -> &'static str {
        match self {
            Feature::FaceSwap => "x-analysis",
            Feature::PromptGeneration => "x-generation-analysis",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Feature::FaceSwap => "Failed to process face swap",
            Feature::PromptGeneration => "Failed to generate image",
        }
    }

    /// Trims the model's analysis to what the response header carries.
    pub fn analysis_excerpt(self, analysis: &str) -> &str {
        match self {
            Feature::FaceSwap => analysis,
            Feature::PromptGeneration => match analysis.char_indices().nth(GENERATION_ANALYSIS_LIMIT) {
                Some((end, _)) => &analysis[..end],
                None => analysis,
            },
        }
    }
}

/// Model names per feature, overridable from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    pub face_swap: String,
    pub prompt_generation: String,
}

impl ModelNames {
    pub fn for_feature(&self, feature: Feature) -> &str {
        match feature {
            Feature::FaceSwap => &self.face_swap,
            Feature::PromptGeneration => &self.prompt_generation,
        }
    }
}

impl Default for ModelNames {
    fn default() -> Self {
        Self {
            face_swap: Feature::FaceSwap.default_model().to_string(),
            prompt_generation: Feature::PromptGeneration.default_model().to_string(),
        }
    }
}

/// A validated-shape request for one of the two flows.
#[derive(Debug, Clone)]
pub enum FeatureRequest {
    FaceSwap {
        source: UploadedFile,
        target: UploadedFile,
    },
    PromptGeneration {
        reference: UploadedFile,
        prompt: String,
    },
}

impl FeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            FeatureRequest::FaceSwap { .. } => Feature::FaceSwap,
            FeatureRequest::PromptGeneration { .. } => Feature::PromptGeneration,
        }
    }

    /// Uploads in the order they are sent to the model, keyed by form field.
    pub fn images(&self) -> Vec<(&'static str, &UploadedFile)> {
        match self {
            FeatureRequest::FaceSwap { source, target } => {
                vec![(SOURCE_FIELD, source), (TARGET_FIELD, target)]
            }
            FeatureRequest::PromptGeneration { reference, .. } => vec![(REFERENCE_FIELD, reference)],
        }
    }

    pub fn instruction(&self) -> String {
        match self {
            FeatureRequest::FaceSwap { .. } => FACE_SWAP_PROMPT.to_string(),
            FeatureRequest::PromptGeneration { prompt, .. } => {
                format!("{GENERATION_PLAN_HEAD}{prompt}{GENERATION_PLAN_TAIL}")
            }
        }
    }

    pub fn model_request(&self, models: &ModelNames) -> ModelRequest {
        ModelRequest {
            model: models.for_feature(self.feature()).to_string(),
            prompt: self.instruction(),
            images: self
                .images()
                .into_iter()
                .map(|(_, file)| InlineImage::from_upload(file))
                .collect(),
        }
    }

    /// The upload returned to the caller in place of a generated result.
    pub fn into_echo(self) -> UploadedFile {
        match self {
            FeatureRequest::FaceSwap { target, .. } => target,
            FeatureRequest::PromptGeneration { reference, .. } => reference,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub template: &'static str,
}

pub const PROMPT_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "professional",
        label: "Professional Portrait",
        description: "Corporate setting with formal attire",
        template: "A professional portrait in a modern corporate office, wearing business attire, with confident posture and natural lighting",
    },
    PromptTemplate {
        id: "outdoor",
        label: "Outdoor Adventure",
        description: "Nature and landscape scenes",
        template: "A person standing in a scenic mountain landscape at golden hour, surrounded by nature, with dramatic sky and warm lighting",
    },
    PromptTemplate {
        id: "casual",
        label: "Casual Lifestyle",
        description: "Relaxed everyday scenarios",
        template: "A person in casual clothing at a cozy coffee shop, smiling naturally, with warm ambient lighting and comfortable atmosphere",
    },
    PromptTemplate {
        id: "creative",
        label: "Creative Concept",
        description: "Artistic and imaginative scenes",
        template: "A person in an artistic studio surrounded by creative elements, dramatic lighting, with vibrant colors and professional composition",
    },
    PromptTemplate {
        id: "travel",
        label: "Travel Destination",
        description: "Global landmark settings",
        template: "A person at an iconic travel destination, wearing casual travel attire, with beautiful background scenery and natural sunlight",
    },
    PromptTemplate {
        id: "fitness",
        label: "Fitness & Wellness",
        description: "Active lifestyle scenarios",
        template: "A person in a modern gym or wellness center, active pose, professional lighting, with fitness equipment in the background",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(name, "image/png", vec![1u8, 2, 3])
    }

    #[test]
    fn test_feature_slugs() {
        assert_eq!(Feature::FaceSwap.slug(), "face-swap");
        assert_eq!(Feature::PromptGeneration.slug(), "prompt-gen");
    }

    #[test]
    fn test_face_swap_sends_source_then_target_and_echoes_target() {
        let request = FeatureRequest::FaceSwap {
            source: png("source.png"),
            target: UploadedFile::new("target.gif", "", vec![9u8]),
        };

        let model_request = request.model_request(&ModelNames::default());
        assert_eq!(model_request.model, "gemini-2.5-flash-image");
        assert_eq!(model_request.images.len(), 2);
        assert_eq!(model_request.images[0].mime_type, "image/png");
        assert_eq!(model_request.images[1].mime_type, "image/gif");
        assert!(model_request.prompt.starts_with("You are an expert in face analysis"));

        assert_eq!(request.into_echo().name, "target.gif");
    }

    #[test]
    fn test_prompt_generation_embeds_user_prompt() {
        let request = FeatureRequest::PromptGeneration {
            reference: png("me.png"),
            prompt: "A person surfing at dawn".to_string(),
        };

        let instruction = request.instruction();
        assert!(instruction.contains("GENERATION TASK:\nA person surfing at dawn\n\nYOUR INSTRUCTIONS:"));

        let models = ModelNames {
            face_swap: "a".to_string(),
            prompt_generation: "b".to_string(),
        };
        assert_eq!(request.model_request(&models).model, "b");
        assert_eq!(request.into_echo().name, "me.png");
    }

    #[test]
    fn test_generation_excerpt_is_limited_to_500_chars() {
        let long = "é".repeat(600);
        let excerpt = Feature::PromptGeneration.analysis_excerpt(&long);
        assert_eq!(excerpt.chars().count(), 500);

        assert_eq!(Feature::PromptGeneration.analysis_excerpt("short"), "short");
        assert_eq!(Feature::FaceSwap.analysis_excerpt(&long), long);
    }

    #[test]
    fn test_prompt_templates_have_unique_ids() {
        let mut ids: Vec<_> = PROMPT_TEMPLATES.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
