pub mod classifier;
pub mod extractor;
pub mod intent_builder;
pub mod paypro;
pub mod router;
pub mod sanitizer;
pub mod wallets;

pub use classifier::{classify, describe, ClassifierContext};
pub use intent_builder::{MenuCompletion, MenuFinished};
pub use paypro::{InvoiceTransport, PayProResolution, PayProResolver, ResolvedInvoice};
pub use router::IncomingDataRouter;
pub use wallets::{StaticWalletDirectory, WalletDirectory, WalletFilter, WalletSummary};
