//! Pinned upstream dependencies

/// Display name of the Closure Library dependency
pub const CLOSURE_NAME: &str = "Closure Library";

/// Closure Library Subversion trunk
pub const CLOSURE_SVN: &str = "http://closure-library.googlecode.com/svn/trunk/";

/// Pinned Closure Library revision
pub const CLOSURE_REV: &str = "235";

/// Checkout location, relative to the project root
pub const CLOSURE_DEST: &str = "closure";

/// Stylesheet fragments, relative to the checkout, in aggregation order
pub const CLOSURE_STYLESHEETS: &[&str] = &[
    "closure/goog/css/common.css",
    "closure/goog/css/dialog.css",
    "closure/goog/css/menu.css",
    "closure/goog/css/menuitem.css",
    "closure/goog/css/menubutton.css",
];
