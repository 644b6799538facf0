use crate::{
    record::{c_chars_to_str, try_char_enum, ts_to_dt},
    Result, SecurityUpdateAction,
};

use super::{ErrorMsg, InstrumentDefMsg, SymbolMappingMsg, SystemMsg};

impl InstrumentDefMsg {
    /// Returns `ts_recv` as a datetime, or `None` if it's unset.
    pub fn ts_recv(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.ts_recv)
    }

    /// Returns the instrument raw symbol assigned by the publisher as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `raw_symbol` isn't a valid C string.
    pub fn raw_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.raw_symbol)
    }

    /// Returns the underlying asset code (product code) of the instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `asset` isn't a valid C string.
    pub fn asset(&self) -> Result<&str> {
        c_chars_to_str(&self.asset)
    }

    /// Returns the security type of the instrument as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `security_type` isn't a valid C string.
    pub fn security_type(&self) -> Result<&str> {
        c_chars_to_str(&self.security_type)
    }

    /// Returns `security_update_action` as a [`SecurityUpdateAction`].
    ///
    /// # Errors
    /// This function returns an error if `security_update_action` isn't a known
    /// [`SecurityUpdateAction`].
    pub fn security_update_action(&self) -> Result<SecurityUpdateAction> {
        try_char_enum(self.security_update_action)
    }
}

impl ErrorMsg {
    /// Returns `err` as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `err` isn't a valid C string.
    pub fn err(&self) -> Result<&str> {
        c_chars_to_str(&self.err)
    }
}

impl SymbolMappingMsg {
    /// Returns the input symbol as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `stype_in_symbol` isn't a valid C string.
    pub fn stype_in_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.stype_in_symbol)
    }

    /// Returns the output symbol as a `&str`.
    ///
    /// # Errors
    /// This function returns an error if `stype_out_symbol` isn't a valid C string.
    pub fn stype_out_symbol(&self) -> Result<&str> {
        c_chars_to_str(&self.stype_out_symbol)
    }

    /// Parses the raw start of the mapping interval into a datetime. Returns `None` if
    /// `start_ts` contains the sentinel for a null timestamp.
    pub fn start_ts(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.start_ts)
    }

    /// Parses the raw end of the mapping interval into a datetime. Returns `None` if
    /// `end_ts` contains the sentinel for a null timestamp.
    pub fn end_ts(&self) -> Option<time::OffsetDateTime> {
        ts_to_dt(self.end_ts)
    }
}

impl SystemMsg {
    /// Returns `true` if this message is a heartbeat, used to indicate the connection
    /// with the gateway is still open.
    pub fn is_heartbeat(&self) -> bool {
        self.msg()
            .map(|msg| msg == crate::SystemMsg::HEARTBEAT)
            .unwrap_or_default()
    }

    /// Returns the message from the Databento Live Subscription Gateway (LSG) as a
    /// `&str`.
    ///
    /// # Errors
    /// This function returns an error if `msg` isn't a valid C string.
    pub fn msg(&self) -> Result<&str> {
        c_chars_to_str(&self.msg)
    }
}
