//! Conversión de la salida del modelo en una lista numerada de recomendaciones.
//!
//! El análisis es permisivo y nunca falla: un texto mal formado produce menos
//! elementos o elementos fusionados. Los números se copian tal cual, sin
//! revalidar duplicados ni orden.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Recommendation;

static ITEM_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.\s*(.*)$").expect("patrón de lista numerada válido"));

/// Una línea `N. texto` abre un elemento nuevo; el resto de líneas no vacías
/// se añaden al elemento abierto separadas por un espacio. Las líneas previas
/// al primer elemento se descartan.
pub fn parse_numbered_list(text: &str) -> Vec<Recommendation> {
    let mut items = Vec::new();
    let mut current: Option<Recommendation> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let opened = ITEM_START.captures(line).and_then(|caps| {
            let number = caps[1].parse::<u64>().ok()?;
            Some(Recommendation {
                number,
                recommendation: caps[2].trim().to_string(),
            })
        });

        match opened {
            Some(item) => {
                if let Some(done) = current.replace(item) {
                    items.push(done);
                }
            }
            None => {
                if let Some(item) = current.as_mut() {
                    if !item.recommendation.is_empty() {
                        item.recommendation.push(' ');
                    }
                    item.recommendation.push_str(line);
                }
            }
        }
    }

    items.extend(current);
    items
}
