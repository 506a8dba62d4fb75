mod feed;
mod item;
mod view;

pub use feed::{
    trackables, CustomOrderRecord, OrderFeed, OrderLine, ProductInfo, ProductRef,
    PurchaseRecord, PurchasedProduct,
};
pub use item::{parse_timestamp, parse_window, OrderStatus, TrackableItem};
pub use view::{build_rows, OrderRow, StatusBadge, CANCEL_LABEL, CANT_CANCEL_LABEL};
