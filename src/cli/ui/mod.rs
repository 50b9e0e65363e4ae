mod frame_view;
mod painter;
mod table;

pub(crate) use self::frame_view::{DecodedFrameView, EncodedFrameView};
pub(crate) use self::painter::Painter;
pub(crate) use self::table::Table;
