use std::rc::Rc;

use crate::runtime::ImageConfig;

/// Lifecycle every widget goes through, driven by its host in this order:
/// `initialize`, `mount`, `unmount`, `dispose`.
///
/// Each teardown step releases what the matching setup step acquired and is
/// safe to call more than once, or without the setup step having run.
pub trait Component {
    fn initialize(&self, config: Rc<ImageConfig>);

    fn mount(&self) {}

    fn unmount(&self) {}

    fn dispose(&self);
}
