//! Lectura y limpieza de campos del diccionario Info del PDF.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// Devuelve el diccionario Info, tanto si el trailer lo referencia como si lo incluye.
pub(crate) fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(reference) => doc.get_dictionary(*reference).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_dictionary_mut(doc: &mut Document) -> Option<&mut Dictionary> {
    let reference: Option<ObjectId> = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(reference) => Some(*reference),
        Object::Dictionary(_) => None,
        _ => return None,
    };

    match reference {
        Some(id) => doc.get_object_mut(id).ok()?.as_dict_mut().ok(),
        None => doc.trailer.get_mut(b"Info").ok()?.as_dict_mut().ok(),
    }
}

/// Valor crudo de un campo, resolviendo referencias indirectas.
pub(crate) fn field_bytes(doc: &Document, key: &[u8]) -> Option<Vec<u8>> {
    let dict = info_dictionary(doc)?;
    let value = dict.get(key).ok()?;
    object_bytes(doc, value, 0)
}

fn object_bytes(doc: &Document, obj: &Object, depth: usize) -> Option<Vec<u8>> {
    match obj {
        Object::String(bytes, _) => Some(bytes.clone()),
        Object::Name(name) => Some(name.clone()),
        Object::Null => None,
        Object::Reference(reference) if depth < 8 => doc
            .get_object(*reference)
            .ok()
            .and_then(|inner| object_bytes(doc, inner, depth + 1)),
        other => Some(format!("{other:?}").into_bytes()),
    }
}

/// Un campo ausente, nulo o vacío (incluido un BOM UTF-16 sin texto) cuenta como vacío.
pub(crate) fn is_blank(value: Option<&[u8]>) -> bool {
    match value {
        None => true,
        Some(bytes) => bytes.is_empty() || bytes == [0xFE, 0xFF],
    }
}

/// Deja vacíos los campos indicados. Los campos ausentes no se crean.
pub(crate) fn clear_fields(doc: &mut Document, keys: &[&[u8]]) -> bool {
    let pending: Vec<&[u8]> = keys
        .iter()
        .copied()
        .filter(|key| !is_blank(field_bytes(doc, key).as_deref()))
        .collect();

    if pending.is_empty() {
        return false;
    }

    let Some(dict) = info_dictionary_mut(doc) else {
        return false;
    };

    for key in pending {
        dict.set(key.to_vec(), Object::String(Vec::new(), StringFormat::Literal));
    }

    true
}

/// Instantánea de los campos que deben sobrevivir intactos a la limpieza.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InfoSnapshot {
    fields: Vec<(&'static [u8], Option<Vec<u8>>)>,
}

impl InfoSnapshot {
    pub(crate) fn capture(doc: &Document, keys: &[&'static [u8]]) -> Self {
        Self {
            fields: keys
                .iter()
                .map(|key| (*key, field_bytes(doc, key)))
                .collect(),
        }
    }

    /// Primer campo cuyo valor difiere del capturado.
    pub(crate) fn first_mismatch(&self, doc: &Document) -> Option<String> {
        self.fields.iter().find_map(|(key, expected)| {
            let actual = field_bytes(doc, key);
            (actual != *expected).then(|| String::from_utf8_lossy(key).into_owned())
        })
    }
}
