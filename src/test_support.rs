//! PDFs de prueba generados con `lopdf`.

use lopdf::{Document, Object, Stream, dictionary};
use std::path::Path;

use crate::title::info::field_bytes;
use crate::title::verify::{PageBox, page_boxes};
use crate::title::xmp::{catalog_metadata_id, read_packet};

pub(crate) type TestResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) const A4: (i64, i64) = (595, 842);
pub(crate) const LETTER: (i64, i64) = (612, 792);

pub(crate) const SAMPLE_INFO: [(&str, &str); 6] = [
    ("Title", "Informe Trimestral"),
    ("Author", "Ana Pérez"),
    ("Subject", "Ventas del tercer trimestre"),
    ("Keywords", "ventas, 2024, trimestre"),
    ("Creator", "Writer"),
    ("Producer", "LibreOffice 7.6"),
];

pub(crate) const SAMPLE_XMP: &str = "<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>
<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">
 <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">
  <rdf:Description rdf:about=\"\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:pdf=\"http://ns.adobe.com/pdf/1.3/\">
   <dc:title><rdf:Alt><rdf:li xml:lang=\"x-default\">Informe Trimestral</rdf:li></rdf:Alt></dc:title>
   <dc:creator><rdf:Seq><rdf:li>Ana Pérez</rdf:li></rdf:Seq></dc:creator>
   <pdf:Producer>LibreOffice 7.6</pdf:Producer>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end=\"w\"?>";

/// Escribe un PDF con una página por tamaño. La primera página hereda su
/// `MediaBox` del nodo `Pages`.
pub(crate) fn write_sample_pdf(
    path: &Path,
    page_sizes: &[(i64, i64)],
    info: &[(&str, &str)],
    xmp: Option<&str>,
) -> TestResult {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for (index, (width, height)) in page_sizes.iter().enumerate() {
        let text = format!("BT /F1 24 Tf 72 700 Td (Pagina {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if index > 0 {
            page.set("MediaBox", media_box(*width, *height));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let (first_width, first_height) = page_sizes.first().copied().unwrap_or(A4);
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_sizes.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box(first_width, first_height),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(packet) = xmp {
        let metadata_id = doc.add_object(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            packet.as_bytes().to_vec(),
        ));
        catalog.set("Metadata", metadata_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    if !info.is_empty() {
        let mut info_dict = lopdf::Dictionary::new();
        for (key, value) in info {
            info_dict.set(*key, Object::string_literal(*value));
        }
        let info_id = doc.add_object(info_dict);
        doc.trailer.set("Info", info_id);
    }

    doc.save(path)?;
    Ok(())
}

fn media_box(width: i64, height: i64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ])
}

pub(crate) fn info_field(path: &Path, key: &str) -> Option<Vec<u8>> {
    let doc = Document::load(path).ok()?;
    field_bytes(&doc, key.as_bytes())
}

pub(crate) fn xmp_packet(path: &Path) -> Option<String> {
    let doc = Document::load(path).ok()?;
    let id = catalog_metadata_id(&doc)?;
    let packet = read_packet(&doc, id).ok()?;
    String::from_utf8(packet).ok()
}

pub(crate) fn page_sizes(path: &Path) -> Vec<PageBox> {
    Document::load(path)
        .map(|doc| page_boxes(&doc))
        .unwrap_or_default()
}

/// Sustituye el contenido del flujo `/Metadata` por bytes arbitrarios.
pub(crate) fn replace_xmp_packet(path: &Path, packet: &[u8]) -> TestResult {
    let mut doc = Document::load(path)?;
    let id = catalog_metadata_id(&doc).ok_or("el PDF no tiene flujo /Metadata")?;
    doc.get_object_mut(id)?
        .as_stream_mut()?
        .set_plain_content(packet.to_vec());
    doc.save(path)?;
    Ok(())
}

/// Añade al trailer un diccionario `/Encrypt` sin cifrar realmente el contenido.
pub(crate) fn mark_encrypted(path: &Path) -> TestResult {
    let mut doc = Document::load(path)?;
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.save(path)?;
    Ok(())
}

/// PDF con árbol de páginas vacío (`/Count 0`) y título en Info.
pub(crate) fn write_pageless_pdf(path: &Path) -> TestResult {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Sin páginas"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.save(path)?;
    Ok(())
}
