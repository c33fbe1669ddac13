//! # Equipment Interface
//!
//! This module defines the interface structures which will be sent to and recieved from equipment
//! servers/clients.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod axis;
pub mod tf;
pub mod vel;
