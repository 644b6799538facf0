use proc_macro::TokenStream;

mod dbn_attr;
mod has_rtype;

/// Dummy derive macro to enable the `dbn` helper attribute for record types
/// using the `dbn_record` proc macro, as helper attributes aren't supported for
/// attribute macros alone. See <https://github.com/rust-lang/rust/issues/65823>.
#[proc_macro_derive(DbnAttr, attributes(dbn))]
pub fn dbn_attr(_item: TokenStream) -> TokenStream {
    TokenStream::new()
}

/// Attribute macro that acts like a derive macro for `Record`, `RecordMut`,
/// `HasRType`, and `AsRef<[u8]>`.
///
/// Expects 1 or more paths to `u8` constants that are the RTypes associated
/// with this record. The struct must implement `bytemuck::Pod`.
///
/// Supports the following `dbn` attributes:
/// - `index_ts`: indicates this field is the primary timestamp for the record
///
/// Note: derive `DbnAttr` to use the `dbn` helper attribute without a compiler
/// error.
#[proc_macro_attribute]
pub fn dbn_record(attr: TokenStream, input: TokenStream) -> TokenStream {
    has_rtype::attribute_macro_impl(attr, input)
}
