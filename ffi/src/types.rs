//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversions live here so `lib.rs`
//! stays focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use adgen_core::error::AdError;
use adgen_core::http::HttpMethod;
use adgen_core::{AdClient, ManualFields, ProductData, ProductRecordStore};

/// Opaque handle to an `AdClient`.
pub struct FfiAdClient {
    pub(crate) inner: AdClient,
}

/// Opaque handle to the product record store.
pub struct FfiProductStore {
    pub(crate) inner: Arc<ProductRecordStore>,
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Allocate a C string. Interior NULs are dropped rather than failing.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

/// Copy a borrowed C string into an owned `String`. Null and invalid UTF-8
/// both read as `None`.
pub(crate) fn from_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_string)
}

/// Free a string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `adgen_build_*`. The host executes it and passes the response
/// back through `adgen_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: adgen_core::HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = req.body.map_or(std::ptr::null_mut(), to_c_string);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

/// User-entered product fields. `brand_name` and `product_name` are
/// required; the other pointers may be null and then read as empty.
#[repr(C)]
pub struct FfiManualFields {
    pub brand_name: *const c_char,
    pub product_name: *const c_char,
    pub product_description: *const c_char,
    pub target_audience: *const c_char,
    pub unique_selling_points: *const c_char,
}

impl FfiManualFields {
    /// `None` if a required field is null or not UTF-8.
    pub(crate) fn to_core(&self) -> Option<ManualFields> {
        Some(ManualFields {
            brand_name: from_c_str(self.brand_name)?,
            product_name: from_c_str(self.product_name)?,
            product_description: from_c_str(self.product_description).unwrap_or_default(),
            target_audience: from_c_str(self.target_audience).unwrap_or_default(),
            unique_selling_points: from_c_str(self.unique_selling_points).unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host builds this on the stack after executing a request. The FFI
/// layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Product record
// ---------------------------------------------------------------------------

/// A `ProductData` exposed to C. `image_url` may be null; every other
/// field is always a valid string.
#[repr(C)]
pub struct FfiProductData {
    pub brand_name: *mut c_char,
    pub product_name: *mut c_char,
    pub product_description: *mut c_char,
    pub target_audience: *mut c_char,
    pub unique_selling_points: *mut c_char,
    pub image_url: *mut c_char,
    pub ad_copy: *mut c_char,
}

impl FfiProductData {
    pub(crate) fn from_core(product: &ProductData) -> Self {
        FfiProductData {
            brand_name: to_c_string(product.brand_name().to_string()),
            product_name: to_c_string(product.product_name().to_string()),
            product_description: to_c_string(product.product_description().to_string()),
            target_audience: to_c_string(product.target_audience().to_string()),
            unique_selling_points: to_c_string(product.unique_selling_points().to_string()),
            image_url: product
                .image_url()
                .map_or(std::ptr::null_mut(), |url| to_c_string(url.to_string())),
            ad_copy: to_c_string(product.ad_copy().to_string()),
        }
    }

    /// Rebuild a normalized core record. `None` if `ad_copy` is missing.
    pub(crate) fn to_core(&self) -> Option<ProductData> {
        Some(ProductData::new(
            from_c_str(self.brand_name).unwrap_or_default(),
            from_c_str(self.product_name).unwrap_or_default(),
            from_c_str(self.product_description).unwrap_or_default(),
            from_c_str(self.target_audience).unwrap_or_default(),
            from_c_str(self.unique_selling_points).unwrap_or_default(),
            from_c_str(self.image_url),
            from_c_str(self.ad_copy)?,
        ))
    }

    /// Free the string fields (not the struct itself).
    pub(crate) fn free_fields(&self) {
        free_c_string(self.brand_name);
        free_c_string(self.product_name);
        free_c_string(self.product_description);
        free_c_string(self.target_audience);
        free_c_string(self.unique_selling_points);
        free_c_string(self.image_url);
        free_c_string(self.ad_copy);
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiAdResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    RequestFailed = 1,
    MalformedResponse = 2,
    Serialization = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null and `product`
/// points to the normalized record. On failure `error_code` gives the
/// category, `error_message` a readable C string, and `product` is null.
/// `http_status` is the non-2xx status for `RequestFailed`, otherwise 0.
#[repr(C)]
pub struct FfiAdResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub product: *mut FfiProductData,
}

impl FfiAdResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        product: *mut FfiProductData,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiAdResult {
            error_code,
            error_message,
            http_status,
            product,
        }))
    }

    pub(crate) fn ok_product(product: ProductData) -> *mut Self {
        let ffi_product = Box::into_raw(Box::new(FfiProductData::from_core(&product)));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, ffi_product)
    }

    pub(crate) fn from_error(err: AdError) -> *mut Self {
        let (error_code, http_status) = match &err {
            AdError::RequestFailed { status, .. } => (FfiErrorCode::RequestFailed, status.unwrap_or(0)),
            AdError::MalformedResponse(_) => (FfiErrorCode::MalformedResponse, 0),
            AdError::Serialization(_) => (FfiErrorCode::Serialization, 0),
        };
        Self::boxed(error_code, to_c_string(err.to_string()), http_status, std::ptr::null_mut())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            to_c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, to_c_string(msg.to_string()), 0, std::ptr::null_mut())
    }
}

/// Observer invoked with each new record. The pointer is only valid for the
/// duration of the call.
pub type FfiProductObserver =
    extern "C" fn(product: *const FfiProductData, user_data: *mut std::ffi::c_void);

/// Carries the host's `user_data` into the observer closure. The host
/// promises the pointer may be used from whichever thread calls
/// `adgen_store_set_current`.
pub(crate) struct ObserverContext {
    pub(crate) callback: FfiProductObserver,
    pub(crate) user_data: *mut std::ffi::c_void,
}

unsafe impl Send for ObserverContext {}
unsafe impl Sync for ObserverContext {}

impl ObserverContext {
    pub(crate) fn notify(&self, product: &ProductData) {
        let ffi_product = FfiProductData::from_core(product);
        (self.callback)(&ffi_product, self.user_data);
        ffi_product.free_fields();
    }
}
