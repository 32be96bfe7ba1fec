//! C-ABI wrapper around `adgen-core` for the mobile host.
//!
//! # Overview
//! Exposes request building, response normalization and the product record
//! store through `extern "C"` functions. The host performs the HTTP
//! round-trip itself (on whatever thread or executor it likes) between
//! `adgen_build_*` and `adgen_parse_*`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `FfiAdResult` envelope carries either a normalized record or an
//!   error code plus message.
//! - The host owns every returned pointer and releases it with the matching
//!   `adgen_free_*` / `*_free` function.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use adgen_core::http::HttpResponse;
use adgen_core::{AdClient, AdError, FileStorage, ProductRecordStore, SubscriptionId};
use tracing::debug;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `AdClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `adgen_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_client_new(base_url: *const c_char) -> *mut FfiAdClient {
    catch_unwind(|| match from_c_str(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiAdClient {
            inner: AdClient::new(&url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `adgen_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_client_free(client: *mut FfiAdClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a generate-from-URL request.
///
/// Returns null if `client` or `product_url` is null. The host should not
/// call this for an empty URL.
/// The caller must free the returned pointer with `adgen_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_build_create_ad(
    client: *const FfiAdClient,
    product_url: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(url) = from_c_str(product_url) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        match client.inner.build_create_ad(&url) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a generate-from-fields request.
///
/// Returns null if `client` or `fields` is null, or if a required field is.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_build_generate_ad_prompt(
    client: *const FfiAdClient,
    fields: *const FfiManualFields,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || fields.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(fields) = unsafe { &*fields }.to_core() else {
            return std::ptr::null_mut();
        };
        match client.inner.build_generate_ad_prompt(&fields) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: from_c_str(resp.body).unwrap_or_default(),
    }
}

/// Normalize the response to a generate-from-URL request.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_parse_create_ad(
    client: *const FfiAdClient,
    response: *const FfiHttpResponse,
) -> *mut FfiAdResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiAdResult::null_arg("client");
        }
        if response.is_null() {
            return FfiAdResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_create_ad(core_resp) {
            Ok(product) => FfiAdResult::ok_product(product),
            Err(e) => FfiAdResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiAdResult::panic("panic in adgen_parse_create_ad"))
}

/// Normalize the response to a generate-from-fields request. `fields` must
/// be the same input the request was built from; product fields are echoed
/// from it.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_parse_generate_ad_prompt(
    client: *const FfiAdClient,
    fields: *const FfiManualFields,
    response: *const FfiHttpResponse,
) -> *mut FfiAdResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiAdResult::null_arg("client");
        }
        if fields.is_null() {
            return FfiAdResult::null_arg("fields");
        }
        if response.is_null() {
            return FfiAdResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let Some(fields) = unsafe { &*fields }.to_core() else {
            return FfiAdResult::null_arg("fields.brand_name/product_name");
        };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_generate_ad_prompt(&fields, core_resp) {
            Ok(product) => FfiAdResult::ok_product(product),
            Err(e) => FfiAdResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiAdResult::panic("panic in adgen_parse_generate_ad_prompt"))
}

/// Wrap a host-side transport failure (no response received) in the same
/// result envelope as parse failures.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_request_failed(cause: *const c_char) -> *mut FfiAdResult {
    catch_unwind(|| {
        let cause = from_c_str(cause).unwrap_or_else(|| "unknown transport error".to_string());
        FfiAdResult::from_error(AdError::RequestFailed { status: None, cause })
    })
    .unwrap_or_else(|_| FfiAdResult::panic("panic in adgen_request_failed"))
}

// ---------------------------------------------------------------------------
// Product record store
// ---------------------------------------------------------------------------

/// Open the record store persisted under directory `dir`, loading any
/// previous record. Returns null if `dir` is null.
/// The caller must free the returned pointer with `adgen_store_free`.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_open(dir: *const c_char) -> *mut FfiProductStore {
    catch_unwind(|| {
        let Some(dir) = from_c_str(dir) else {
            return std::ptr::null_mut();
        };
        debug!(dir = %dir, "opening product record store");
        let store = ProductRecordStore::new(Arc::new(FileStorage::new(dir)));
        Box::into_raw(Box::new(FfiProductStore {
            inner: Arc::new(store),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a store created by `adgen_store_open`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_free(store: *mut FfiProductStore) {
    if !store.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(store) });
        }));
    }
}

/// Copy of the current record, or null if there is none.
/// The caller must free a non-null result with `adgen_free_product`.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_current(store: *const FfiProductStore) -> *mut FfiProductData {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return std::ptr::null_mut();
        }
        match unsafe { &*store }.inner.current() {
            Some(product) => Box::into_raw(Box::new(FfiProductData::from_core(&product))),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Replace the current record, persist it and notify observers
/// synchronously. Returns `false` if an argument is null or `ad_copy` is
/// missing. The record is normalized on the way in.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_set_current(
    store: *const FfiProductStore,
    product: *const FfiProductData,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() || product.is_null() {
            return false;
        }
        let Some(product) = unsafe { &*product }.to_core() else {
            return false;
        };
        unsafe { &*store }.inner.set_current(product);
        true
    }))
    .unwrap_or(false)
}

/// Register `callback` to be called with every new record, on the thread
/// that calls `adgen_store_set_current`. Returns a subscription id for
/// `adgen_store_unsubscribe`, or `u64::MAX` if `store` is null.
///
/// The callback must not call `adgen_store_set_current` on the same store:
/// the writer lock is still held while observers run, so that deadlocks.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_subscribe(
    store: *const FfiProductStore,
    callback: FfiProductObserver,
    user_data: *mut std::ffi::c_void,
) -> u64 {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return u64::MAX;
        }
        let context = ObserverContext { callback, user_data };
        unsafe { &*store }
            .inner
            .subscribe(move |product| context.notify(product))
            .as_u64()
    }))
    .unwrap_or(u64::MAX)
}

/// Returns `true` if `subscription` was registered and is now removed.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_store_unsubscribe(store: *const FfiProductStore, subscription: u64) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return false;
        }
        unsafe { &*store }
            .inner
            .unsubscribe(SubscriptionId::from_u64(subscription))
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `adgen_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiAdResult` returned by any parse function, including its
/// product. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_free_result(result: *mut FfiAdResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        adgen_free_product(result.product);
    });
}

/// Free an `FfiProductData` returned by `adgen_store_current`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_free_product(product: *mut FfiProductData) {
    if product.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let product = unsafe { Box::from_raw(product) };
        product.free_fields();
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn adgen_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
