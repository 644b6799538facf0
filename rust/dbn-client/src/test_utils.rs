use std::{cell::RefCell, num::NonZeroU64, sync::Once};

use log::{Level, LevelFilter, Log, Metadata as LogMetadata, Record as LogRecord};
use time::macros::date;

use crate::{MappingInterval, Metadata, SType, Schema, SymbolMapping};

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(Level, String)>>> = const { RefCell::new(None) };
}

/// Records log messages emitted on the thread of the test that enabled capturing, so
/// tests running in parallel don't see each other's messages.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &LogMetadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        CAPTURED.with(|captured| {
            if let Some(logs) = captured.borrow_mut().as_mut() {
                logs.push((record.level(), record.args().to_string()));
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Runs `f`, returning its result and every message logged on this thread while it ran.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    INIT.call_once(|| {
        // another test harness may have installed a logger already
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let res = f();
    let logs = CAPTURED
        .with(|captured| captured.borrow_mut().take())
        .unwrap_or_default();
    (res, logs)
}

/// Metadata with every variable-length section populated.
pub fn test_metadata(version: u8) -> Metadata {
    Metadata::builder()
        .version(version)
        .dataset("XNAS.ITCH")
        .schema(Some(Schema::Trades))
        .start(1_704_153_600_000_000_000)
        .end(NonZeroU64::new(1_704_412_800_000_000_000))
        .limit(NonZeroU64::new(100))
        .stype_in(Some(SType::RawSymbol))
        .stype_out(Some(SType::InstrumentId))
        .symbols(vec!["AAPL".to_owned(), "MSFT".to_owned()])
        .partial(vec!["NVDA".to_owned()])
        .not_found(vec!["QQQQQ".to_owned()])
        .mappings(vec![
            SymbolMapping {
                raw_symbol: "AAPL".to_owned(),
                intervals: vec![
                    MappingInterval {
                        start_date: date!(2024 - 01 - 02),
                        end_date: date!(2024 - 01 - 04),
                        symbol: "32".to_owned(),
                    },
                    MappingInterval {
                        start_date: date!(2024 - 01 - 04),
                        end_date: date!(2024 - 01 - 05),
                        symbol: "33".to_owned(),
                    },
                ],
            },
            SymbolMapping {
                raw_symbol: "MSFT".to_owned(),
                intervals: vec![MappingInterval {
                    start_date: date!(2024 - 01 - 02),
                    end_date: date!(2024 - 01 - 05),
                    symbol: "7152".to_owned(),
                }],
            },
        ])
        .build()
}
