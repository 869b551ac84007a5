//! COSE_Key constants (RFC 8152)

/// COSE_Key map parameters
pub const COSE_KEY_KTY: i32 = 1;
pub const COSE_KEY_ALG: i32 = 3;

/// COSE_Key Types (KTY)
pub const COSE_KEY_KTY_EC2: i32 = 2;

/// COSE Key Algorithms (ALG)
pub const COSE_KEY_ALGO_ES256: i32 = -7;

/// COSE EC2 Key Parameters
pub const COSE_KEY_EC2_CRV: i32 = -1;
pub const COSE_KEY_EC2_X: i32 = -2;
pub const COSE_KEY_EC2_Y: i32 = -3;

/// COSE EC2 Curve identifier for P-256.
pub const COSE_KEY_EC2_CRV_P256: i32 = 1;
