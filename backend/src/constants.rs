// =============================================================================
// Kindred Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// =============================================================================
// PROFILE VALIDATION
// =============================================================================

/// Minimum age a profile may declare
pub const MIN_PROFILE_AGE: i32 = 18;

/// Maximum age a profile may declare
pub const MAX_PROFILE_AGE: i32 = 100;

/// Minimum character length for first and last names
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum character limit for the about section
pub const ABOUT_CHAR_LIMIT: usize = 400;

/// Maximum number of skills a profile may list
pub const MAX_SKILLS: usize = 20;

// =============================================================================
// FEED CONFIGURATION
// =============================================================================

/// Default number of candidates returned per feed page
pub const DEFAULT_FEED_LIMIT: i64 = 10;

/// Maximum number of candidates returned per feed page
pub const MAX_FEED_LIMIT: i64 = 50;

// =============================================================================
// UPLOAD SESSION CONFIGURATION
// =============================================================================

/// How long an issued upload grant stays valid, in minutes
pub const DEFAULT_UPLOAD_TTL_MINUTES: i64 = 15;

/// Length of the random token embedded in an upload URL
pub const UPLOAD_TOKEN_LENGTH: usize = 32;
