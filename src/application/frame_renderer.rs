// Rendering collaborator trait
use crate::domain::dashboard::DashboardFrame;
use async_trait::async_trait;

#[async_trait]
pub trait FrameRenderer: Send + Sync {
    /// Draw one frame. Failures are reported, the render loop keeps going.
    async fn render(&self, frame: &DashboardFrame) -> anyhow::Result<()>;
}
