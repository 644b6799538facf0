use proc_macro2::{Ident, Span, TokenStream};
use proc_macro_crate::FoundCrate;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    spanned::Spanned,
    ExprPath, ItemStruct, Token,
};

use crate::dbn_attr::{find_dbn_attr_args, INDEX_TS_ATTR};

pub fn attribute_macro_impl(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let args = parse_macro_input!(attr as Args);
    if args.rtypes.is_empty() {
        return syn::Error::new(
            args.span,
            "Need to specify at least one rtype to match against",
        )
        .into_compile_error()
        .into();
    }
    let input_struct = parse_macro_input!(input as ItemStruct);
    expand(&args, &input_struct)
        .unwrap_or_else(|e| e.into_compile_error())
        .into()
}

fn expand(args: &Args, input_struct: &ItemStruct) -> syn::Result<TokenStream> {
    if !input_struct.generics.params.is_empty() {
        return Err(syn::Error::new(
            input_struct.generics.span(),
            "dbn_record doesn't support generic records",
        ));
    }
    let record_type = &input_struct.ident;
    let raw_index_ts = raw_index_ts_fn(input_struct)?;
    let rtypes = args.rtypes.iter();
    let crate_name = crate_name();
    Ok(quote! (
        #input_struct

        impl #crate_name::record::Record for #record_type {
            fn header(&self) -> &#crate_name::record::RecordHeader {
                &self.hd
            }
            #raw_index_ts
        }

        impl #crate_name::record::RecordMut for #record_type {
            fn header_mut(&mut self) -> &mut #crate_name::record::RecordHeader {
                &mut self.hd
            }
        }

        impl #crate_name::record::HasRType for #record_type {
            #[allow(deprecated)]
            fn has_rtype(rtype: u8) -> bool {
                matches!(rtype, #(#rtypes)|*)
            }
        }

        impl AsRef<[u8]> for #record_type {
            fn as_ref(&self) -> &[u8] {
                #crate_name::bytemuck::bytes_of(self)
            }
        }
    ))
}

/// Resolves the path to the `dbn-client` crate from the invoking crate, like
/// `$crate` in `macro_rules` macros.
fn crate_name() -> TokenStream {
    match proc_macro_crate::crate_name("dbn-client") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!( ::#ident )
        }
        // Records are only declared inside the library itself
        Ok(FoundCrate::Itself) | Err(_) => quote!(crate),
    }
}

struct Args {
    rtypes: Vec<ExprPath>,
    span: Span,
}

impl Parse for Args {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let rtypes = Punctuated::<ExprPath, Token![,]>::parse_terminated(input)?;
        Ok(Args {
            rtypes: rtypes.into_iter().collect(),
            span: input.span(),
        })
    }
}

fn raw_index_ts_fn(input_struct: &ItemStruct) -> syn::Result<TokenStream> {
    let mut index_ts_fields = Vec::new();
    for field in input_struct.fields.iter() {
        if find_dbn_attr_args(field)?
            .iter()
            .any(|id| id == INDEX_TS_ATTR)
        {
            if let Some(ident) = field.ident.as_ref() {
                index_ts_fields.push(ident);
            }
        }
    }
    match index_ts_fields.as_slice() {
        [] => Ok(quote!()),
        [index_ts] => Ok(quote!(
            fn raw_index_ts(&self) -> u64 {
                self.#index_ts
            }
        )),
        _ => Err(syn::Error::new(
            input_struct.span(),
            "Only one field can be marked index_ts",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args_single() {
        let input = quote!(rtype::MBO);
        let args = syn::parse2::<Args>(input).unwrap();
        assert_eq!(args.rtypes.len(), 1);
    }

    #[test]
    fn parse_args_multiple() {
        let input = quote!(rtype::BBO_1S, rtype::BBO_1M);
        let args = syn::parse2::<Args>(input).unwrap();
        assert_eq!(args.rtypes.len(), 2);
    }

    #[test]
    fn parse_args_empty() {
        let input = quote!();
        let args = syn::parse2::<Args>(input).unwrap();
        assert!(args.rtypes.is_empty());
    }

    #[test]
    fn index_ts_picks_marked_field() {
        let input = syn::parse2::<ItemStruct>(quote!(
            pub struct TradeMsg {
                pub hd: RecordHeader,
                #[dbn(index_ts)]
                pub ts_recv: u64,
            }
        ))
        .unwrap();
        let tokens = raw_index_ts_fn(&input).unwrap().to_string();
        assert!(tokens.contains("ts_recv"));
    }

    #[test]
    fn index_ts_rejects_duplicates() {
        let input = syn::parse2::<ItemStruct>(quote!(
            pub struct TradeMsg {
                pub hd: RecordHeader,
                #[dbn(index_ts)]
                pub ts_recv: u64,
                #[dbn(index_ts)]
                pub ts_ref: u64,
            }
        ))
        .unwrap();
        assert!(raw_index_ts_fn(&input).is_err());
    }

    #[test]
    fn rejects_generic_records() {
        let args = syn::parse2::<Args>(quote!(rtype::MBO)).unwrap();
        let input = syn::parse2::<ItemStruct>(quote!(
            pub struct Wrapper<T> {
                pub hd: RecordHeader,
                pub rec: T,
            }
        ))
        .unwrap();
        assert!(expand(&args, &input).is_err());
    }
}
