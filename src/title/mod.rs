//! Borrado del título de un PDF conservando el resto de su metadata.

mod constants;
pub(crate) mod info;
pub(crate) mod verify;
pub(crate) mod xmp;

use lopdf::Document;
use std::path::Path;

use crate::error::TransformError;

use constants::{TITLE_KEY, TRACKED_INFO_FIELDS};
use verify::{DocumentFingerprint, verify_output};

/// Qué campos, además del título, se vacían al limpiar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TitlePolicy {
    pub clear_author: bool,
    pub clear_subject: bool,
    pub clear_keywords: bool,
    pub clear_creator: bool,
    pub clear_producer: bool,
    /// Quita también `dc:title` del paquete XMP del catálogo.
    pub strip_xmp_title: bool,
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self {
            clear_author: false,
            clear_subject: false,
            clear_keywords: false,
            clear_creator: false,
            clear_producer: false,
            strip_xmp_title: true,
        }
    }
}

impl TitlePolicy {
    fn clears(&self, key: &[u8]) -> bool {
        match key {
            TITLE_KEY => true,
            b"Author" => self.clear_author,
            b"Subject" => self.clear_subject,
            b"Keywords" => self.clear_keywords,
            b"Creator" => self.clear_creator,
            b"Producer" => self.clear_producer,
            _ => false,
        }
    }

    pub(crate) fn fields_to_clear(&self) -> Vec<&'static [u8]> {
        TRACKED_INFO_FIELDS
            .into_iter()
            .filter(|key| self.clears(key))
            .collect()
    }

    pub(crate) fn preserved_fields(&self) -> Vec<&'static [u8]> {
        TRACKED_INFO_FIELDS
            .into_iter()
            .filter(|key| !self.clears(key))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripOutcome {
    /// Se escribió una copia limpia en la ruta de salida.
    Stripped,
    /// El título ya estaba vacío; no se escribió nada.
    AlreadyBlank,
}

/// Lee `input`, vacía el título y escribe el resultado verificado en `output`.
///
/// Si el documento ya no tiene título no se crea `output`. Ante cualquier error
/// `output` puede quedar a medio escribir y es responsabilidad del llamador borrarlo.
pub fn strip_title(
    input: &Path,
    output: &Path,
    policy: &TitlePolicy,
) -> Result<StripOutcome, TransformError> {
    let mut doc = Document::load(input).map_err(TransformError::Load)?;

    if doc.trailer.has(b"Encrypt") {
        return Err(TransformError::Encrypted);
    }

    let fingerprint = DocumentFingerprint::capture(&doc, policy);
    if fingerprint.page_count() == 0 {
        return Err(TransformError::NoPages);
    }

    let mut changed = info::clear_fields(&mut doc, &policy.fields_to_clear());
    if policy.strip_xmp_title {
        changed |= xmp::strip_catalog_title(&mut doc)?;
    }

    if !changed {
        return Ok(StripOutcome::AlreadyBlank);
    }

    doc.save(output)
        .map_err(|e| TransformError::Save(e.to_string()))?;

    verify_output(output, &fingerprint, policy)?;

    Ok(StripOutcome::Stripped)
}
