//! Prompt composition for the generation capability.
//!
//! Pure functions from unit content to prompt text; no side effects. The
//! templates are opaque to the rest of the pipeline.

/// Prompt asking the model to turn a document into a slide-by-slide plan.
///
/// The response must be a flat JSON object using `s<i>` keys for slides and
/// `v<i>` keys for the transition between slide `i` and slide `i+1`.
pub fn plan_prompt(style: &str) -> String {
    format!(
        r#"You are an expert presentation designer and narrative stylist.

Analyze the attached document and produce a slide-by-slide presentation plan
in strict JSON, fully in the requested visual style and consistent across the
whole plan.

## STYLE

{style}

## REQUIREMENTS

1. For each slide, write one single paragraph of story-driven content in the
   requested style: a vivid scene with characters, actions, emotional tone and
   visual atmosphere, detailed enough for an image-generation model to
   visualize precisely.
2. The content must faithfully convey the meaning of the corresponding part of
   the document; a reader should be able to reconstruct the document's main
   argument from the full sequence of slides.
3. The slides must form a coherent narrative arc with a consistent world,
   consistent characters and logical progression.
4. For each pair of consecutive slides, also write one short paragraph
   describing the visual transition between them.
5. Each slide expresses exactly one core idea, through narrative rather than
   bullet points.

## OUTPUT FORMAT (JSON ONLY, no markdown, no comments, no trailing commas)

{{
  "s1": "Story paragraph for slide 1...",
  "v1": "Transition from slide 1 to slide 2...",
  "s2": "Story paragraph for slide 2...",
  ...
}}
"#
    )
}

/// Prompt for generating one slide image.
///
/// When a reference image accompanies the request, the prompt instructs the
/// model to match its style so consecutive slides stay visually continuous.
pub fn slide_prompt(content: &str, has_reference: bool) -> String {
    let reference_instruction = if has_reference {
        "\nSTYLE REFERENCE:\nA reference image is provided. Match its artistic style, character design, \
         color palette and overall visual language exactly. Only the scene content may differ.\n"
    } else {
        ""
    };

    format!(
        r#"Create a 16:9 illustration of the following scene.

STYLE REQUIREMENTS:
- Soft, warm, natural lighting
- Characters with consistent proportions, textures and expressions
- A grounded, coherent world; no text overlays
{reference_instruction}
SCENE DESCRIPTION:
{content}

OUTPUT:
One high-quality 16:9 image of the scene."#
    )
}

/// Prompt for generating one transition video segment between two slides.
pub fn transition_prompt(content: &str, duration_secs: u32) -> String {
    format!(
        r#"Create a short animated video segment based on the following scene.

## SCENE DESCRIPTION
{content}

## VIDEO REQUIREMENTS
1. Duration: approximately {duration_secs} seconds
2. Animate from the first provided frame to the last provided frame
3. Natural, expressive character movement; smooth, gentle camera work
4. Keep the artistic style of the provided frames throughout
5. No text overlays; purely visual storytelling

## OUTPUT
One animated video segment that bridges the two frames."#
    )
}
