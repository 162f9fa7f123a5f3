//! The preview component and its external handle.

use std::cell::RefCell;
use std::rc::Rc;

use mdpreview_tree::{Element, to_html};

use crate::config::{PointerEvent, PreviewConfig, ScrollEvent};
use crate::error::RenderError;
use crate::runner;

type ContainerCell = Rc<RefCell<Option<Rc<Element>>>>;

/// A mounted markdown preview.
///
/// Owns the current configuration and the rendered container. The matching
/// [`PreviewHandle`] is created once at mount and stays valid for the
/// component's whole mounted lifetime; only the container it points at is
/// replaced across renders.
pub struct Preview {
    config: Rc<RefCell<PreviewConfig>>,
    container: ContainerCell,
    handle: PreviewHandle,
}

impl Preview {
    /// Mount a preview with the given configuration.
    #[must_use]
    pub fn mount(config: PreviewConfig) -> Self {
        let config = Rc::new(RefCell::new(config));
        let container: ContainerCell = Rc::new(RefCell::new(None));
        let handle = PreviewHandle {
            config: Rc::clone(&config),
            container: ContainerRef {
                inner: Rc::clone(&container),
            },
        };
        Self {
            config,
            container,
            handle,
        }
    }

    /// Render a document and replace the container the handle points at.
    ///
    /// A failed render leaves the previous container in place.
    pub fn render(&self, source: Option<&str>) -> Result<Rc<Element>, RenderError> {
        let tree = {
            let config = self.config.borrow();
            runner::render(source, &config)?
        };
        let tree = Rc::new(tree);
        *self.container.borrow_mut() = Some(Rc::clone(&tree));
        Ok(tree)
    }

    /// Swap the configuration used by subsequent renders.
    ///
    /// Visible through the handle immediately; the current container is not
    /// re-rendered.
    pub fn set_config(&self, config: PreviewConfig) {
        *self.config.borrow_mut() = config;
    }

    /// The handle for this preview.
    #[must_use]
    pub fn handle(&self) -> PreviewHandle {
        self.handle.clone()
    }

    /// Serialize the current container to HTML, if anything has rendered.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        self.container.borrow().as_ref().map(|el| to_html(el))
    }

    /// Forward a scroll event to the configured callback.
    pub fn dispatch_scroll(&self, event: ScrollEvent) {
        let callback = self.config.borrow().on_scroll.clone();
        if let Some(callback) = callback {
            callback(&event);
        }
    }

    /// Forward a pointer-over event to the configured callback.
    pub fn dispatch_pointer_over(&self, event: PointerEvent) {
        let callback = self.config.borrow().on_pointer_over.clone();
        if let Some(callback) = callback {
            callback(&event);
        }
    }

    /// Unmount the preview. Outstanding handles observe an empty container
    /// afterwards.
    pub fn unmount(self) {
        *self.container.borrow_mut() = None;
    }
}

/// External handle to a mounted [`Preview`]: the current configuration plus
/// a live reference to the rendered container.
#[derive(Clone)]
pub struct PreviewHandle {
    config: Rc<RefCell<PreviewConfig>>,
    container: ContainerRef,
}

impl PreviewHandle {
    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> PreviewConfig {
        self.config.borrow().clone()
    }

    /// Reference to the rendered container.
    #[must_use]
    pub fn container(&self) -> ContainerRef {
        self.container.clone()
    }
}

/// Live reference to the rendered container element.
///
/// The target is replaced on every successful render; reads in between are
/// stable and do not trigger re-renders.
#[derive(Clone)]
pub struct ContainerRef {
    inner: ContainerCell,
}

impl ContainerRef {
    /// The current container, or `None` before the first render and after
    /// unmount.
    #[must_use]
    pub fn get(&self) -> Option<Rc<Element>> {
        self.inner.borrow().clone()
    }
}
