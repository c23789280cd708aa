//! Plantillas de instrucciones para el modelo generativo.

use crate::models::RetrievalResult;

const QA_TEMPLATE: &str = "\
Eres un asesor de viajes amable y preciso.
Responde a la pregunta del usuario usando únicamente la información del documento.
Si el documento no contiene la respuesta, dilo explícitamente.

Contenido del documento:
{context}

Pregunta del usuario:
{question}

Respuesta:";

const RECOMMENDATION_TEMPLATE: &str = "\
Eres un experto en preparación de viajes.
A partir de la información del destino, recomienda con detalle lo que el viajero debe llevar y preparar.
Presenta cada recomendación en su propia línea, empezando por su número seguido de un punto (\"1. \", \"2. \", ...).

Información del destino:
{context}

Recomendaciones:";

/// Las dos plantillas fijas del núcleo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Pregunta y respuesta: usa `{context}` y `{question}`.
    Question,
    /// Lista numerada de preparativos: sólo `{context}`.
    Recommendations,
}

impl PromptKind {
    pub fn template(self) -> &'static str {
        match self {
            PromptKind::Question => QA_TEMPLATE,
            PromptKind::Recommendations => RECOMMENDATION_TEMPLATE,
        }
    }
}

/// Concatena el texto de los chunks en orden de relevancia, separados por `\n`.
pub fn build_context(result: &RetrievalResult) -> String {
    result
        .chunks()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rellena la plantilla en una sola pasada, de modo que el texto insertado
/// (documento o pregunta) nunca se vuelve a interpretar como marcador.
pub fn render(kind: PromptKind, context: &str, question: Option<&str>) -> String {
    let mut values = vec![("context", context)];
    if kind == PromptKind::Question {
        values.push(("question", question.unwrap_or_default()));
    }
    substitute(kind.template(), &values)
}

fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
