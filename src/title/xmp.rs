//! Eliminación de `dc:title` en el paquete XMP del catálogo.
//!
//! El XML se interpreta con `xmltree` para decidir, elemento a elemento y según su
//! espacio de nombres, qué títulos se quitan; el borrado se hace sobre el texto del
//! paquete para no alterar prefijos, atributos ni el relleno `xpacket`.

use lopdf::{Document, ObjectId};
use tracing::warn;
use xmltree::{Element, XMLNode};

use crate::error::TransformError;

use super::constants::{DC_NS, XMP_ROOTS};

/// Describe cómo localizar un elemento dentro del árbol XMP.
#[derive(Clone, Copy)]
struct FieldSpec<'a> {
    local_name: &'a str,
    namespace: &'a str,
}

const TITLE_SPEC: FieldSpec<'static> = FieldSpec {
    local_name: "title",
    namespace: DC_NS,
};

/// Identificador del flujo `/Metadata` del catálogo, si existe.
pub(crate) fn catalog_metadata_id(doc: &Document) -> Option<ObjectId> {
    let root_id = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = doc.get_dictionary(root_id).ok()?;
    catalog.get(b"Metadata").ok()?.as_reference().ok()
}

/// Contenido descomprimido del flujo XMP.
pub(crate) fn read_packet(doc: &Document, id: ObjectId) -> Result<Vec<u8>, TransformError> {
    let stream = doc.get_object(id)?.as_stream()?;
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| TransformError::Xmp(format!("no se pudo descomprimir el flujo: {}", e)))
    } else {
        Ok(stream.content.clone())
    }
}

/// Quita `dc:title` del XMP del documento. Devuelve `true` si hubo cambios.
pub(crate) fn strip_catalog_title(doc: &mut Document) -> Result<bool, TransformError> {
    let Some(id) = catalog_metadata_id(doc) else {
        return Ok(false);
    };

    let packet = read_packet(doc, id)?;
    let Some(cleaned) = strip_title_from_packet(&packet)? else {
        return Ok(false);
    };

    doc.get_object_mut(id)?
        .as_stream_mut()?
        .set_plain_content(cleaned);
    Ok(true)
}

/// Indica si el paquete conserva algún `dc:title`.
///
/// Un paquete vacío, sin raíz XMP o en una codificación distinta de UTF-8 no
/// tiene título que se pueda quitar.
pub(crate) fn packet_has_title(packet: &[u8]) -> Result<bool, TransformError> {
    let Some(text) = packet_text(packet) else {
        return Ok(false);
    };
    let Some(root) = parse_root(text)? else {
        return Ok(false);
    };
    Ok(count_titles(&root).dublin_core > 0)
}

/// Devuelve el paquete sin títulos, o `None` si no había nada que quitar.
pub(crate) fn strip_title_from_packet(packet: &[u8]) -> Result<Option<Vec<u8>>, TransformError> {
    let Some(text) = packet_text(packet) else {
        warn!("Paquete XMP con codificación distinta de UTF-8, se deja sin cambios");
        return Ok(None);
    };
    let Some(root) = parse_root(text)? else {
        return Ok(None);
    };

    let targets = removal_targets(&root);
    if targets.is_empty() {
        return Ok(None);
    }

    let mut cleaned = text.to_string();
    for target in &targets {
        cleaned = remove_flagged(&cleaned, target)?;
    }

    let Some(cleaned_root) = parse_root(&cleaned)? else {
        return Err(TransformError::Xmp(
            "el paquete perdió su raíz durante la limpieza".to_string(),
        ));
    };
    let before = count_titles(&root);
    let after = count_titles(&cleaned_root);
    if after.dublin_core > 0 {
        return Err(TransformError::Xmp(
            "el título sigue presente tras la limpieza".to_string(),
        ));
    }
    if after.foreign != before.foreign {
        return Err(TransformError::Xmp(
            "la limpieza alteró títulos de otros espacios de nombres".to_string(),
        ));
    }

    Ok(Some(cleaned.into_bytes()))
}

fn packet_text(packet: &[u8]) -> Option<&str> {
    std::str::from_utf8(packet).ok()
}

/// Árbol XMP del paquete, o `None` si no contiene ninguna raíz reconocida.
fn parse_root(text: &str) -> Result<Option<Element>, TransformError> {
    let Some(xml) = extract_xmp_xml(text) else {
        return Ok(None);
    };
    Element::parse(xml.as_bytes())
        .map(Some)
        .map_err(|e| TransformError::Xmp(e.to_string()))
}

fn extract_xmp_xml(text: &str) -> Option<&str> {
    XMP_ROOTS.iter().find_map(|(open, close)| {
        let start = text.find(open)?;
        let end = text.rfind(close)? + close.len();
        (end > start).then(|| &text[start..end])
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TitleCount {
    dublin_core: usize,
    foreign: usize,
}

fn count_titles(element: &Element) -> TitleCount {
    let mut count = TitleCount::default();
    visit_elements(element, &mut |child: &Element| {
        if element_matches(child, &TITLE_SPEC) {
            count.dublin_core += 1;
        } else if child.name == TITLE_SPEC.local_name {
            count.foreign += 1;
        }
    });
    count
}

/// Elementos con un mismo nombre cualificado en orden de documento, marcando
/// cuáles son `dc:title`.
struct RemovalTarget {
    qualified: String,
    remove: Vec<bool>,
}

fn removal_targets(root: &Element) -> Vec<RemovalTarget> {
    let mut names: Vec<String> = Vec::new();
    visit_elements(root, &mut |child: &Element| {
        if element_matches(child, &TITLE_SPEC) {
            let name = qualified_name(child);
            if !names.contains(&name) {
                names.push(name);
            }
        }
    });

    names
        .into_iter()
        .map(|qualified| {
            let mut remove = Vec::new();
            visit_elements(root, &mut |child: &Element| {
                if qualified_name(child) == qualified {
                    remove.push(element_matches(child, &TITLE_SPEC));
                }
            });
            RemovalTarget { qualified, remove }
        })
        .collect()
}

/// Recorre los descendientes en preorden, el mismo orden en que aparecen sus
/// etiquetas de apertura en el texto.
fn visit_elements(element: &Element, visit: &mut dyn FnMut(&Element)) {
    for node in &element.children {
        if let XMLNode::Element(child) = node {
            visit(child);
            visit_elements(child, visit);
        }
    }
}

fn qualified_name(element: &Element) -> String {
    match &element.prefix {
        Some(prefix) => format!("{prefix}:{}", element.name),
        None => element.name.clone(),
    }
}

fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    element.name == spec.local_name && element.namespace.as_deref() == Some(spec.namespace)
}

/// Borra del texto los elementos marcados de `target`, con todo su contenido.
/// La n-ésima etiqueta de apertura del texto corresponde a la n-ésima marca.
fn remove_flagged(text: &str, target: &RemovalTarget) -> Result<String, TransformError> {
    let open = format!("<{}", target.qualified);
    let close = format!("</{}", target.qualified);

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut index = 0;

    while let Some(start) = find_tag(rest, &open) {
        let remove = target.remove.get(index).copied().ok_or_else(|| {
            TransformError::Xmp(format!(
                "el texto contiene más etiquetas `{}` que el árbol",
                target.qualified
            ))
        })?;
        index += 1;

        if !remove {
            let keep = start + open.len();
            output.push_str(&rest[..keep]);
            rest = &rest[keep..];
            continue;
        }

        output.push_str(&rest[..start]);
        let after_open = &rest[start..];
        let (consumed, nested) = element_extent(after_open, &open, &close, &target.qualified)?;
        index += nested;
        rest = &after_open[consumed..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Longitud del elemento que empieza en `text` y cuántas etiquetas del mismo
/// nombre contiene.
fn element_extent(
    text: &str,
    open: &str,
    close: &str,
    qualified: &str,
) -> Result<(usize, usize), TransformError> {
    let unclosed = || TransformError::Xmp(format!("falta el cierre de `{qualified}`"));

    let tag_end = text.find('>').ok_or_else(unclosed)?;
    if text[..tag_end].ends_with('/') {
        return Ok((tag_end + 1, 0));
    }

    let mut depth = 1;
    let mut nested = 0;
    let mut cursor = tag_end + 1;

    loop {
        let remaining = &text[cursor..];
        let next_close = find_tag(remaining, close).ok_or_else(unclosed)?;
        let next_open = find_tag(remaining, open).filter(|position| *position < next_close);

        let at = cursor + next_open.unwrap_or(next_close);
        let end = text[at..].find('>').ok_or_else(unclosed)?;

        if next_open.is_some() {
            nested += 1;
            if !text[at..at + end].ends_with('/') {
                depth += 1;
            }
        } else {
            depth -= 1;
        }
        cursor = at + end + 1;

        if depth == 0 {
            return Ok((cursor, nested));
        }
    }
}

/// Posición de `tag` seguida de un delimitador de nombre, para no confundir
/// `<dc:title` con `<dc:titles`.
fn find_tag(text: &str, tag: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find(tag) {
        let position = offset + found;
        let next = text[position + tag.len()..].chars().next();
        if matches!(next, Some('>' | '/' | ' ' | '\t' | '\r' | '\n')) {
            return Some(position);
        }
        offset = position + tag.len();
    }
    None
}
