//! # filecopier – FTP
//!
//! Moves one file to or from an FTP server per call:
//!   • Control connection with RFC 959 command/response codec
//!   • USER/PASS login, binary `TYPE I`, FEAT probing
//!   • Passive data channel (PASV or EPSV)
//!   • Streaming RETR / STOR with local directory creation
//!   • QUIT teardown on every exit path

pub mod ftp;
