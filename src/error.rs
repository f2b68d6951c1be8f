use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport: width={width}, height={height}, hours_visible={hours_visible}")]
    InvalidViewport {
        width: u32,
        height: u32,
        hours_visible: u32,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
