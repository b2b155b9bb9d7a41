//! Claves del diccionario Info y espacios de nombres XMP utilizados al limpiar.

pub const TITLE_KEY: &[u8] = b"Title";

/// Campos estándar del diccionario Info que se vigilan durante la verificación.
pub const TRACKED_INFO_FIELDS: [&[u8]; 6] = [
    TITLE_KEY,
    b"Author",
    b"Subject",
    b"Keywords",
    b"Creator",
    b"Producer",
];

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Pares de apertura y cierre aceptados como raíz del paquete XMP.
pub const XMP_ROOTS: [(&str, &str); 3] = [
    ("<x:xmpmeta", "</x:xmpmeta>"),
    ("<x:xapmeta", "</x:xapmeta>"),
    ("<rdf:RDF", "</rdf:RDF>"),
];

/// Límite al recorrer la cadena de `/Parent` buscando atributos heredados.
pub const MAX_PAGE_TREE_DEPTH: usize = 64;
