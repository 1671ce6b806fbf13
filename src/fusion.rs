//! Fusion engine: aggregates one stage's unit artifacts into a composite.
//!
//! Slide fusion renders every slide image as one full-bleed 16:9 page of a
//! PDF deck. Video fusion concatenates segment artifacts into one stream,
//! first with a frame-accurate re-encode join (segments need not share
//! encoding parameters), falling back to a stream-copy concat driven by a
//! file-list manifest when the re-encode path is unavailable. Composite
//! outputs are derived artifacts, fully rebuildable from the units.

use crate::config::FusionConfig;
use crate::error::{FusionError, PipelineError};
use crate::store::{ArtifactStore, Stage};
use printpdf::image_crate;
use printpdf::{Image, ImageTransform, Mm, PdfDocument, Pt};
use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

// 16:9 page, the original deck's 13.333in x 7.5in
const PAGE_WIDTH_MM: f32 = 338.667;
const PAGE_HEIGHT_MM: f32 = 190.5;
const RENDER_DPI: f32 = 300.0;

const STDERR_SAMPLE_LEN: usize = 400;

pub struct FusionEngine<'a> {
    store: &'a ArtifactStore,
    config: &'a FusionConfig,
}

impl<'a> FusionEngine<'a> {
    pub fn new(store: &'a ArtifactStore, config: &'a FusionConfig) -> Self {
        Self { store, config }
    }

    /// Render all slide artifacts, in the shared numeric order, into one
    /// PDF deck. No-op with a warning when no slide artifacts exist.
    pub fn fuse_slides(&self) -> Result<Option<PathBuf>, PipelineError> {
        let slides = self.store.list(Stage::Slides)?;
        if slides.is_empty() {
            warn!("no slide artifacts to fuse");
            return Ok(None);
        }

        info!(slides = slides.len(), "rendering deck");
        let rendered = render_deck(&slides).map_err(PipelineError::Fusion)?;
        let target = self.store.write_deck(&rendered)?;
        info!(path = %target.display(), "deck saved");
        Ok(Some(target))
    }

    /// Concatenate all video segments, in the shared numeric order, into one
    /// continuous stream. No-op with a warning when no segments exist.
    ///
    /// A failed re-encode falls through to the stream-copy strategy; when
    /// both fail the error names both causes and the target is not written.
    pub fn fuse_video(&self) -> Result<Option<PathBuf>, PipelineError> {
        let segments = self.store.list(Stage::Videos)?;
        if segments.is_empty() {
            warn!("no video segments to fuse");
            return Ok(None);
        }

        let target = self.store.fused_video_path();
        info!(segments = segments.len(), path = %target.display(), "fusing video segments");

        match self.compose_reencode(&segments, &target) {
            Ok(()) => {
                info!("video fused via frame-accurate re-encode");
                Ok(Some(target))
            }
            Err(primary) => {
                warn!(error = %primary, "re-encode compose unavailable, falling back to stream copy");
                match self.concat_stream_copy(&segments, &target) {
                    Ok(()) => {
                        info!("video fused via stream copy");
                        Ok(Some(target))
                    }
                    Err(fallback) => Err(FusionError::StrategiesExhausted {
                        primary: primary.to_string(),
                        fallback: fallback.to_string(),
                    }
                    .into()),
                }
            }
        }
    }

    /// Primary strategy: decode and re-encode every clip through the
    /// encoder's concat filter for a frame-accurate join.
    fn compose_reencode(&self, segments: &[PathBuf], target: &Path) -> Result<(), FusionError> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
        ];
        for segment in segments {
            args.push("-i".into());
            args.push(segment.clone().into_os_string());
        }
        args.push("-filter_complex".into());
        args.push(concat_filter(segments.len(), self.config.preserve_audio).into());
        args.push("-map".into());
        args.push("[v]".into());
        if self.config.preserve_audio {
            args.push("-map".into());
            args.push("[a]".into());
            args.push("-c:a".into());
            args.push(self.config.audio_codec.clone().into());
        } else {
            args.push("-an".into());
        }
        args.push("-c:v".into());
        args.push(self.config.video_codec.clone().into());
        args.push(target.to_path_buf().into_os_string());

        run_encoder(&self.config.encoder, &args)
    }

    /// Fallback strategy: stream-copy concat via a file-list manifest.
    /// Requires all segments to share compatible codec parameters; the
    /// encoder fails fast when they do not. The manifest is a temp file
    /// removed on drop, on every exit path.
    fn concat_stream_copy(&self, segments: &[PathBuf], target: &Path) -> Result<(), FusionError> {
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let mut manifest = tempfile::Builder::new()
            .prefix("concat-")
            .suffix(".txt")
            .tempfile_in(dir)?;
        for segment in segments {
            let absolute = fs::canonicalize(segment).unwrap_or_else(|_| segment.clone());
            manifest.write_all(manifest_entry(&absolute).as_bytes())?;
        }
        manifest.flush()?;

        let args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            manifest.path().as_os_str().to_os_string(),
            "-c".into(),
            "copy".into(),
            target.to_path_buf().into_os_string(),
        ];
        run_encoder(&self.config.encoder, &args)
    }
}

/// Concat filter graph for `n` inputs, e.g.
/// `[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[v][a]`.
fn concat_filter(n: usize, with_audio: bool) -> String {
    let mut filter = String::new();
    for i in 0..n {
        filter.push_str(&format!("[{}:v]", i));
        if with_audio {
            filter.push_str(&format!("[{}:a]", i));
        }
    }
    filter.push_str(&format!(
        "concat=n={}:v=1:a={}[v]",
        n,
        if with_audio { 1 } else { 0 }
    ));
    if with_audio {
        filter.push_str("[a]");
    }
    filter
}

/// One line of the concat-demuxer manifest. Single quotes in the path are
/// closed, escaped and reopened, the quoting rule the demuxer expects.
fn manifest_entry(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', r"'\''");
    format!("file '{}'\n", escaped)
}

fn run_encoder(program: &str, args: &[OsString]) -> Result<(), FusionError> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FusionError::EncoderMissing(program.to_string())
        } else {
            FusionError::Io(e)
        }
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr: String = stderr.trim().chars().take(STDERR_SAMPLE_LEN).collect();
        return Err(FusionError::EncoderFailed {
            status: output.status.code().unwrap_or(-1),
            stderr,
        });
    }
    Ok(())
}

fn render_deck(slides: &[PathBuf]) -> Result<Vec<u8>, FusionError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "presentation",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "slide",
    );

    let mut page = first_page;
    let mut layer = first_layer;
    for (i, slide) in slides.iter().enumerate() {
        if i > 0 {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "slide");
            page = next_page;
            layer = next_layer;
        }
        let bytes = fs::read(slide)?;
        let decoded = image_crate::load_from_memory(&bytes).map_err(|e| {
            FusionError::Deck(format!("failed to decode {}: {}", slide.display(), e))
        })?;
        let image = Image::from_dynamic_image(&decoded);
        let transform = full_bleed_transform(&image);
        image.add_to_layer(doc.get_page(page).get_layer(layer), transform);
    }

    let mut rendered = Vec::new();
    doc.save(&mut BufWriter::new(&mut rendered))
        .map_err(|e| FusionError::Deck(e.to_string()))?;
    Ok(rendered)
}

/// Scale an image to cover the whole page.
fn full_bleed_transform(image: &Image) -> ImageTransform {
    let width = image.image.width.into_pt(RENDER_DPI);
    let height = image.image.height.into_pt(RENDER_DPI);
    let page_width: Pt = Mm(PAGE_WIDTH_MM).into();
    let page_height: Pt = Mm(PAGE_HEIGHT_MM).into();
    ImageTransform {
        translate_x: Some(Mm(0.0)),
        translate_y: Some(Mm(0.0)),
        scale_x: Some(page_width.0 / width.0),
        scale_y: Some(page_height.0 / height.0),
        dpi: Some(RENDER_DPI),
        ..Default::default()
    }
}
