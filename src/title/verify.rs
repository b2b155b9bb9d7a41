//! Comprobaciones sobre el PDF reescrito antes de sustituir el original.

use lopdf::{Document, Object, ObjectId};
use std::path::Path;

use crate::error::TransformError;

use super::TitlePolicy;
use super::constants::MAX_PAGE_TREE_DEPTH;
use super::info::{InfoSnapshot, field_bytes, is_blank};
use super::xmp::{catalog_metadata_id, packet_has_title, read_packet};

/// `MediaBox` efectivo de una página, heredado del árbol de páginas si hace falta.
pub(crate) type PageBox = Option<[f32; 4]>;

/// Huella del documento original que la copia limpia debe respetar.
#[derive(Clone, Debug)]
pub(crate) struct DocumentFingerprint {
    pages: Vec<PageBox>,
    preserved: InfoSnapshot,
}

impl DocumentFingerprint {
    pub(crate) fn capture(doc: &Document, policy: &TitlePolicy) -> Self {
        Self {
            pages: page_boxes(doc),
            preserved: InfoSnapshot::capture(doc, &policy.preserved_fields()),
        }
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub(crate) fn page_boxes(doc: &Document) -> Vec<PageBox> {
    doc.get_pages()
        .values()
        .map(|page_id| media_box(doc, *page_id))
        .collect()
}

fn media_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = current.get(b"MediaBox") {
            return rectangle(doc, value);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn rectangle(doc: &Document, value: &Object) -> PageBox {
    let value = match value {
        Object::Reference(reference) => doc.get_object(*reference).ok()?,
        other => other,
    };
    let items = value.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }

    let mut rect = [0.0_f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Some(rect)
}

fn number(value: &Object) -> Option<f32> {
    match value {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

/// Recarga la copia escrita y confirma páginas, título vacío y campos preservados.
pub(crate) fn verify_output(
    output: &Path,
    fingerprint: &DocumentFingerprint,
    policy: &TitlePolicy,
) -> Result<(), TransformError> {
    let doc = Document::load(output)
        .map_err(|e| TransformError::Verification(format!("la copia no es legible: {}", e)))?;

    let pages = page_boxes(&doc);
    if pages.len() != fingerprint.pages.len() {
        return Err(TransformError::Verification(format!(
            "número de páginas distinto: {} frente a {}",
            pages.len(),
            fingerprint.pages.len()
        )));
    }

    if let Some(index) = pages
        .iter()
        .zip(&fingerprint.pages)
        .position(|(actual, expected)| actual != expected)
    {
        return Err(TransformError::Verification(format!(
            "la página {} cambió de dimensiones",
            index + 1
        )));
    }

    for key in policy.fields_to_clear() {
        if !is_blank(field_bytes(&doc, key).as_deref()) {
            return Err(TransformError::Verification(format!(
                "el campo {} no quedó vacío",
                String::from_utf8_lossy(key)
            )));
        }
    }

    if let Some(field) = fingerprint.preserved.first_mismatch(&doc) {
        return Err(TransformError::Verification(format!(
            "el campo {field} se modificó"
        )));
    }

    if policy.strip_xmp_title
        && let Some(id) = catalog_metadata_id(&doc)
        && packet_has_title(&read_packet(&doc, id)?)?
    {
        return Err(TransformError::Verification(
            "el XMP conserva el título".to_string(),
        ));
    }

    Ok(())
}
