//! Joins per-scene clips into one video track and interleaves the narration
//! audio into the final container.

use bytes::Bytes;

use crate::encode::strategy::{EncodeContext, EncodedVideo};
use crate::foundation::error::{ScenereelError, ScenereelResult};

/// Workspace entry name of the silent, concatenated video track.
pub(crate) const SILENT_VIDEO: &str = "video_silent.mp4";
/// Workspace entry name of the concat list consumed by the engine.
pub(crate) const CONCAT_LIST: &str = "concat.txt";
/// Workspace entry name of the finished container.
pub(crate) const FINAL_VIDEO: &str = "final_video.mp4";

/// Join encoded scenes into one continuous silent video track, in scene
/// order, with no gaps or reordering. Returns the track's workspace entry.
pub(crate) async fn concatenate(
    ctx: &EncodeContext<'_>,
    encoded: &EncodedVideo,
) -> ScenereelResult<String> {
    let name = match encoded {
        // The frame-stream strategy already produced one continuous track.
        EncodedVideo::Stream(name) => name.clone(),
        EncodedVideo::Clips(clips) => {
            if clips.is_empty() {
                return Err(ScenereelError::validation("no clips to concatenate"));
            }
            ctx.ensure_live()?;
            ctx.reporter.log("merging clips");

            let list = clips
                .iter()
                .map(|c| format!("file '{c}'\n"))
                .collect::<String>();
            ctx.stage(CONCAT_LIST, list.as_bytes()).await?;

            ctx.track(SILENT_VIDEO);
            let args = [
                "-f", "concat", "-safe", "0", "-i", CONCAT_LIST, "-c", "copy", SILENT_VIDEO,
            ]
            .map(str::to_owned);
            ctx.engine.engine().exec(&args).await?;
            SILENT_VIDEO.to_owned()
        }
    };

    ctx.phases.concat_done(ctx.reporter);
    Ok(name)
}

/// Interleave the narration audio as a second track and finalize the
/// container. "Shortest stream wins": the output is trimmed to the shorter
/// of the video and audio tracks.
pub(crate) async fn mux_audio(
    ctx: &EncodeContext<'_>,
    video_entry: &str,
    audio_entry: &str,
) -> ScenereelResult<Bytes> {
    ctx.ensure_live()?;
    ctx.reporter.log("adding audio");

    ctx.track(FINAL_VIDEO);
    let args = [
        "-i",
        video_entry,
        "-i",
        audio_entry,
        "-c:v",
        "copy",
        "-c:a",
        "aac",
        "-shortest",
        "-movflags",
        "+faststart",
        FINAL_VIDEO,
    ]
    .map(str::to_owned);
    ctx.engine
        .engine()
        .exec(&args)
        .await
        .map_err(|e| match e {
            ScenereelError::Engine(msg) => {
                ScenereelError::finalize(format!("audio mux failed: {msg}"))
            }
            other => other,
        })?;

    let bytes = ctx.engine.engine().read_output(FINAL_VIDEO).await.map_err(|e| {
        ScenereelError::finalize(format!("could not read finished container: {e}"))
    })?;
    if bytes.is_empty() {
        return Err(ScenereelError::finalize(
            "finished container is empty; refusing to expose partial output",
        ));
    }
    Ok(bytes)
}
