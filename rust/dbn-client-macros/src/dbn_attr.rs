//! Common functionality for working with the `#[dbn(...)]` helper attribute.

use proc_macro2::Ident;
use syn::{Field, Meta};

/// Marks the field holding a record's primary timestamp.
pub const INDEX_TS_ATTR: &str = "index_ts";

/// Returns the identifiers listed in a field's `#[dbn(...)]` attribute, e.g.
/// `index_ts` from `#[dbn(index_ts)]`.
pub fn find_dbn_attr_args(field: &Field) -> syn::Result<Vec<Ident>> {
    let mut args = Vec::new();
    for attr in field.attrs.iter() {
        if let Meta::List(ref meta_list) = attr.meta {
            if meta_list.path.is_ident("dbn") {
                meta_list.parse_nested_meta(|meta| {
                    if let Some(ident) = meta.path.get_ident() {
                        args.push(ident.clone());
                        Ok(())
                    } else {
                        Err(meta.error("expected a plain identifier"))
                    }
                })?;
            }
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::FieldsNamed;

    use super::*;

    #[test]
    fn find_args_index_ts() {
        let input = quote!({
            #[dbn(index_ts)]
            pub ts_recv: u64,
        });
        let fields = syn::parse2::<FieldsNamed>(input).unwrap();
        let args = find_dbn_attr_args(fields.named.first().unwrap()).unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0], INDEX_TS_ATTR);
    }

    #[test]
    fn find_args_none() {
        let input = quote!({
            /// The common header.
            pub hd: RecordHeader,
        });
        let fields = syn::parse2::<FieldsNamed>(input).unwrap();
        assert!(find_dbn_attr_args(fields.named.first().unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn find_args_rejects_paths() {
        let input = quote!({
            #[dbn(a::b)]
            pub ts: u64,
        });
        let fields = syn::parse2::<FieldsNamed>(input).unwrap();
        assert!(find_dbn_attr_args(fields.named.first().unwrap()).is_err());
    }
}
