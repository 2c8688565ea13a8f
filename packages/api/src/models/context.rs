use serde_json::{Map, Value, json};

use crate::utils::iri::ResourceKind;

const VOCAB: &str = "/docs.jsonld#";
const HYDRA: &str = "http://www.w3.org/ns/hydra/core#";

/// Members of each resource. `true` marks members holding IRIs.
fn members(kind: ResourceKind) -> &'static [(&'static str, bool)] {
    match kind {
        ResourceKind::Building => &[
            ("name", false),
            ("description", false),
            ("isPublished", false),
            ("datePublished", false),
        ],
        ResourceKind::Image => &[
            ("contentUrl", false),
            ("alternateName", false),
            ("uploadDate", false),
        ],
        ResourceKind::Person => &[
            ("name", false),
            ("email", false),
            ("ledProjects", true),
            ("image", true),
        ],
        ResourceKind::Project => &[
            ("name", false),
            ("description", false),
            ("foreman", true),
            ("photos", true),
            ("createdAt", false),
            ("updatedAt", false),
        ],
        ResourceKind::ProjectPhoto => &[
            ("shortDescription", false),
            ("photo", true),
            ("project", true),
            ("name", false),
            ("url", false),
            ("createdAt", false),
            ("updatedAt", false),
        ],
    }
}

fn base() -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("@vocab".into(), json!(VOCAB));
    context.insert("hydra".into(), json!(HYDRA));
    context
}

/// The JSON-LD context document served at `/contexts/{name}`, or `None`
/// for an unknown name.
pub fn context_document(name: &str) -> Option<Value> {
    let mut context = base();
    match name {
        "Entrypoint" => {
            context.insert("Entrypoint".into(), json!("Entrypoint"));
            for kind in ResourceKind::ALL {
                let key = kind.entrypoint_key();
                context.insert(
                    key.into(),
                    json!({ "@id": format!("Entrypoint/{key}"), "@type": "@id" }),
                );
            }
        }
        "Error" => {}
        other => {
            let kind = ResourceKind::from_short_name(other)?;
            // Image members come from schema.org.
            let prefix = match kind {
                ResourceKind::Image => "http://schema.org/".to_string(),
                _ => format!("{}/", kind.short_name()),
            };
            context.insert(kind.short_name().into(), json!(kind.type_name()));
            for (member, is_iri) in members(kind) {
                let id = format!("{prefix}{member}");
                let value = if *is_iri {
                    json!({ "@id": id, "@type": "@id" })
                } else {
                    json!(id)
                };
                context.insert((*member).into(), value);
            }
        }
    }
    Some(json!({ "@context": context }))
}
