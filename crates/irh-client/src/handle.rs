//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Boilerplate shared by remote object handles."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---

/// Declare a remote object handle. Handles compare by object id.
macro_rules! remote_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            id: $crate::ObjectId,
            connection: $crate::Connection,
        }

        impl $name {
            pub(crate) fn new(id: $crate::ObjectId, connection: $crate::Connection) -> Self {
                Self { id, connection }
            }

            /// Remote object id.
            pub fn id(&self) -> $crate::ObjectId {
                self.id
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.id).finish()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $name {}

        impl ::std::hash::Hash for $name {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}
