pub mod building;
pub mod image;
pub mod person;
pub mod project;
pub mod project_photo;

use crate::utils::iri::{ResourceKind, iri};

/// Integer identity shared by every persisted resource.
pub trait Identifier {
    const KIND: ResourceKind;

    fn identifier(&self) -> i32;

    fn iri(&self) -> String {
        iri(Self::KIND, self.identifier())
    }
}

macro_rules! impl_identifier {
    ($($module:ident => $kind:ident),* $(,)?) => {
        $(
            impl Identifier for $module::Model {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn identifier(&self) -> i32 {
                    self.id
                }
            }
        )*
    };
}

impl_identifier! {
    building => Building,
    image => Image,
    person => Person,
    project => Project,
    project_photo => ProjectPhoto,
}
