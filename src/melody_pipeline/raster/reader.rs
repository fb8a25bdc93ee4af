use crate::melody_pipeline::common::error::Result;
use crate::melody_pipeline::raster::types::RasterImage;

pub trait RasterImageReader {
    fn read_raster(&self, data: &[u8]) -> Result<RasterImage>;
}
