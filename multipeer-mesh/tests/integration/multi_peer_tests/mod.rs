mod test_client_full_connect;
