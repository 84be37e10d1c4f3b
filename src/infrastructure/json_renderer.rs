// JSON lines renderer - One frame per line for an external drawing client
use crate::application::frame_renderer::FrameRenderer;
use crate::domain::dashboard::DashboardFrame;
use crate::infrastructure::frame_mapper::frame_to_view;
use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

pub struct JsonLinesRenderer<W> {
    out: Mutex<W>,
}

impl JsonLinesRenderer<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> FrameRenderer for JsonLinesRenderer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn render(&self, frame: &DashboardFrame) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(&frame_to_view(frame)).context("Failed to encode frame")?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await.context("Failed to write frame")?;
        out.flush().await.context("Failed to flush frame")?;
        Ok(())
    }
}
