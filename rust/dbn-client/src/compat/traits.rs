use crate::{Record, SecurityUpdateAction};

/// Symbol mapping fields common to every DBN version, so consumers such as
/// [`PitSymbolMap`](crate::PitSymbolMap) can accept any of them.
pub trait SymbolMappingRec: Record {
    /// The symbol in the input symbology.
    ///
    /// # Errors
    /// This function returns an error if the field isn't valid UTF-8.
    fn stype_in_symbol(&self) -> crate::Result<&str>;

    /// The symbol in the output symbology.
    ///
    /// # Errors
    /// This function returns an error if the field isn't valid UTF-8.
    fn stype_out_symbol(&self) -> crate::Result<&str>;

    /// Start of the mapping in UNIX nanoseconds.
    fn raw_start_ts(&self) -> u64;

    /// End of the mapping in UNIX nanoseconds.
    fn raw_end_ts(&self) -> u64;
}

/// Instrument definition fields common to every DBN version.
pub trait InstrumentDefRec: Record {
    /// The publisher's symbol for the instrument.
    ///
    /// # Errors
    /// This function returns an error if the field isn't valid UTF-8.
    fn raw_symbol(&self) -> crate::Result<&str>;

    /// The product code. Wider in version 3.
    ///
    /// # Errors
    /// This function returns an error if the field isn't valid UTF-8.
    fn asset(&self) -> crate::Result<&str>;

    /// The security type, e.g. `FUT`.
    ///
    /// # Errors
    /// This function returns an error if the field isn't valid UTF-8.
    fn security_type(&self) -> crate::Result<&str>;

    /// Whether the definition was added, modified or deleted.
    ///
    /// # Errors
    /// This function returns an error if the raw value isn't a known
    /// [`SecurityUpdateAction`].
    fn security_update_action(&self) -> crate::Result<SecurityUpdateAction>;

    /// The channel the definition was published on.
    fn channel_id(&self) -> u16;
}
