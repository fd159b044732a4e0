//! Binary glTF inspection
//!
//! The render host parses the mesh itself; here we only check that the bytes
//! are a GLB container and count the materials so the model's surface list
//! can be built once at load time.

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::error::AssetLoadError;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// A downloaded model ready to hand to the render host
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableModel {
    pub bytes: Vec<u8>,
    /// Paintable surfaces (materials); at least one
    pub surfaces: usize,
    pub mesh_count: usize,
}

#[derive(Deserialize)]
struct GltfIndex {
    #[serde(default)]
    materials: Vec<IgnoredAny>,
    #[serde(default)]
    meshes: Vec<IgnoredAny>,
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Validate a GLB container and count its materials and meshes
pub fn inspect(url: &str, bytes: Vec<u8>) -> Result<RenderableModel, AssetLoadError> {
    let parse_err = |reason: &str| AssetLoadError::Parse {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if bytes.len() < HEADER_LEN + CHUNK_HEADER_LEN {
        return Err(parse_err("file too short for a GLB header"));
    }
    if read_u32(&bytes, 0) != Some(GLB_MAGIC) {
        return Err(parse_err("missing glTF magic"));
    }
    match read_u32(&bytes, 4) {
        Some(GLB_VERSION) => {}
        Some(v) => return Err(parse_err(&format!("unsupported GLB version {}", v))),
        None => return Err(parse_err("truncated header")),
    }
    let declared = read_u32(&bytes, 8).unwrap_or(0) as usize;
    if declared > bytes.len() {
        return Err(parse_err("declared length exceeds data"));
    }

    let chunk_len = read_u32(&bytes, HEADER_LEN).unwrap_or(0) as usize;
    if read_u32(&bytes, HEADER_LEN + 4) != Some(CHUNK_JSON) {
        return Err(parse_err("first chunk is not JSON"));
    }
    let start = HEADER_LEN + CHUNK_HEADER_LEN;
    let json = start
        .checked_add(chunk_len)
        .and_then(|end| bytes.get(start..end))
        .ok_or_else(|| parse_err("JSON chunk runs past end of data"))?;

    let index: GltfIndex = serde_json::from_slice(json)
        .map_err(|e| parse_err(&format!("bad JSON chunk: {}", e)))?;

    Ok(RenderableModel {
        surfaces: index.materials.len().max(1),
        mesh_count: index.meshes.len(),
        bytes,
    })
}

/// Minimal GLB with `materials` materials and one mesh
#[cfg(test)]
pub(crate) fn build_glb(materials: usize) -> Vec<u8> {
    let mats: Vec<String> = (0..materials).map(|i| format!("{{\"name\":\"m{}\"}}", i)).collect();
    let mut json = format!(
        "{{\"asset\":{{\"version\":\"2.0\"}},\"meshes\":[{{\"primitives\":[]}}],\"materials\":[{}]}}",
        mats.join(",")
    )
    .into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = HEADER_LEN + CHUNK_HEADER_LEN + json.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    out
}
