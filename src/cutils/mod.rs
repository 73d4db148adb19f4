pub(crate) fn cerr<Int: Copy + TryInto<libc::c_long>>(res: Int) -> std::io::Result<Int> {
    match res.try_into() {
        Ok(-1) => Err(std::io::Error::last_os_error()),
        _ => Ok(res),
    }
}

#[cfg(test)]
mod test {
    use super::cerr;

    #[test]
    fn cerr_maps_minus_one_to_errno() {
        assert!(cerr(0).is_ok());
        assert!(cerr(17).is_ok());

        // trigger a real error so errno is meaningful
        let res = unsafe { libc::close(-1) };
        let err = cerr(res).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }
}
