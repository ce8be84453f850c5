//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate for TIFF I/O with the ModelPixelScale and
//! ModelTiepoint tags carrying the geotransform. Cell values are widened to
//! f64 on read and written as 64-bit float.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray64Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
const GEO_KEY_DIRECTORY: Tag = Tag::GeoKeyDirectoryTag;

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {e}")))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {e}")))?;

    let data: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::U8(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::U32(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::I8(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::I16(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        DecodingResult::I32(buf) => buf.iter().map(|&v| f64::from(v)).collect(),
        _ => {
            return Err(Error::Other(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

/// Attempt to read a GeoTransform from the GeoTIFF tags
fn read_geotransform(decoder: &mut Decoder<File>) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(MODEL_PIXEL_SCALE)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(MODEL_TIEPOINT)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        let pixel_width = scale[0];
        let pixel_height = -scale[1]; // Negative for north-up

        return Ok(GeoTransform::new(origin_x, origin_y, pixel_width, pixel_height));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Write a Raster to a GeoTIFF file as 64-bit float
pub fn write_geotiff<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {e}")))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f64> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray64Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {e}")))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(MODEL_PIXEL_SCALE, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {e}")))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(MODEL_TIEPOINT, tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {e}")))?;

    // Minimal GeoKeyDirectory: GTModelTypeGeoKey=Projected,
    // GTRasterTypeGeoKey=RasterPixelIsArea
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2,
        1024, 0, 1, 1,
        1025, 0, 1, 1,
    ];
    image
        .encoder()
        .write_tag(GEO_KEY_DIRECTORY, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {e}")))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {e}")))?;

    Ok(())
}
