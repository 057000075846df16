// Utility Module
// File collaborators for keys, plaintext and ciphertext

pub mod file_ops;
